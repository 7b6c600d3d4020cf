/// Curated permitted actions per integration type.
///
/// Entries are human-readable and may be written with or without a toolkit
/// prefix; casing and separators don't matter. Every variant the matcher
/// needs is derived when the table is compiled.
pub const CURATED: &[(&str, &[&str])] = &[
    (
        "calendly",
        &[
            "Get user",
            "List events",
            "Get event",
            "Cancel event",
            "List event invitees",
            "List event types",
            "Get event type",
            "Create scheduling link",
            "Create One-Off event Type",
            "List user availability schedules",
        ],
    ),
    (
        "google_calendar",
        &[
            "List events",
            "Find event",
            "Create event",
            "Update event",
            "Delete event",
            "Quick add",
            "List calendars",
            "GOOGLECALENDAR_FIND_FREE_SLOTS",
            "GOOGLECALENDAR_GET_CURRENT_DATE_TIME",
        ],
    ),
    (
        "hubspot",
        &[
            "Create contact",
            "Search contacts",
            "Get contact",
            "Update contact",
            "Create deal",
            "Create note",
            "Create task",
        ],
    ),
    (
        "salesforce",
        &[
            "Create lead",
            "Get lead",
            "Update lead",
            "Search leads",
            "Create contact",
            "Create task",
            "Salesforce Create note",
        ],
    ),
    (
        "cal_com",
        &[
            "List bookings",
            "Get booking",
            "Create booking",
            "Cancel booking",
            "Reschedule booking",
            "List event types",
            "Get available slots",
        ],
    ),
];
