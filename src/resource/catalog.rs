// Every resource the API serves. Writable lists mirror the columns created
// by the migrations, minus identifiers, parent references and timestamps.

use super::ResourceSpec;

pub static USERS: ResourceSpec = ResourceSpec {
    name: "User",
    plural: "Users",
    path: "users",
    table: "users",
    primary_key: "userId",
    writable: &[
        "gender",
        "birthdate",
        "firstName",
        "middleName",
        "lastName",
        "title",
        "preferredName",
        "datingUppers",
        "datingDowners",
        "premium",
        "profileCreated",
    ],
    parent: None,
};

pub static PARTNERS: ResourceSpec = ResourceSpec {
    name: "Partner",
    plural: "Partners",
    path: "partners",
    table: "partners",
    primary_key: "partnerId",
    writable: &[
        "firstName",
        "lastName",
        "nickname",
        "gender",
        "birthdate",
        "relationshipStatus",
        "anniversary",
    ],
    parent: Some("userId"),
};

pub static LOGINS: ResourceSpec = ResourceSpec {
    name: "Login",
    plural: "Logins",
    path: "logins",
    table: "logins",
    primary_key: "loginId",
    writable: &["provider", "email", "username", "lastLoginAt"],
    parent: Some("userId"),
};

pub static SURVEYS: ResourceSpec = ResourceSpec {
    name: "Survey",
    plural: "Surveys",
    path: "surveys",
    table: "surveys",
    primary_key: "surveyId",
    writable: &["surveyType", "title", "answers", "score", "completedAt"],
    parent: Some("userId"),
};

pub static JOURNALS: ResourceSpec = ResourceSpec {
    name: "Journal",
    plural: "Journals",
    path: "journals",
    table: "journals",
    primary_key: "journalId",
    writable: &["title", "entry", "mood", "entryDate"],
    parent: Some("userId"),
};

/// Read-only through the API; served by the flat `/api/users/:userId/events` route
pub static EVENTS: ResourceSpec = ResourceSpec {
    name: "Event",
    plural: "Events",
    path: "events",
    table: "events",
    primary_key: "eventId",
    writable: &["partnerId", "title", "description", "category", "eventDate"],
    parent: Some("userId"),
};

/// Child resources mounted under `/api/users/:userId/<path>`
pub static USER_CHILDREN: [&ResourceSpec; 4] = [&PARTNERS, &LOGINS, &SURVEYS, &JOURNALS];

/// Every resource, parents before children
pub static RESOURCES: [&ResourceSpec; 6] = [&USERS, &PARTNERS, &LOGINS, &SURVEYS, &JOURNALS, &EVENTS];

/// Non-owning references: `(resource, column, referenced resource)`. The
/// column is cleared, not cascaded, when the referenced row goes away.
pub static NULLABLE_REFERENCES: [(&ResourceSpec, &str, &ResourceSpec); 1] =
    [(&EVENTS, "partnerId", &PARTNERS)];
