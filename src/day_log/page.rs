//! The day page: one editable row per hour and the day's worked hours.

use axum::{
    Extension, Form,
    extract::{FromRef, Path, Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use maud::{Markup, html};
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    alert::{ALERT_CONTAINER_ID, Alert},
    api::{ApiClient, Session},
    day_log::core::{
        TimeEntry, TimeEntryForm, TimeEntryRequest, day_rows, get_day_entries, get_worked_hours,
        save_time_entry,
    },
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_SECONDARY_STYLE, CARD_STYLE, FORM_CHECKBOX_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, TABLE_HEADER_STYLE, base,
    },
    navigation::NavBar,
    period::{format_date, parse_date, parse_optional_date},
    status::{Status, StatusOrder, get_statuses},
    timezone::local_today,
};

const WORKED_HOURS_ID: &str = "worked-hours";
const ROW_GRID_STYLE: &str = "grid grid-cols-[4rem_4rem_1fr_12rem_6rem] gap-4 items-center px-4 py-2";

/// The state needed for the day page.
#[derive(Debug, Clone)]
pub struct DayLogState {
    pub api: ApiClient,
    pub local_timezone: String,
}

impl FromRef<AppState> for DayLogState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DayQuery {
    pub date: Option<String>,
}

/// Show the time entries for the requested date, defaulting to today.
pub async fn get_day_page(
    State(state): State<DayLogState>,
    Extension(session): Extension<Session>,
    jar: CookieJar,
    Query(query): Query<DayQuery>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let (date, date_error) = match parse_optional_date(query.date.as_deref()) {
        Ok(date) => (date.unwrap_or(today), None),
        Err(Error::Validation(message)) => (today, Some(message)),
        Err(error) => return Err(error),
    };

    let (entries, worked_hours, statuses) = tokio::try_join!(
        get_day_entries(&state.api, &session, date),
        get_worked_hours(&state.api, &session, date),
        get_statuses(&state.api, &session),
    )?;
    let statuses = StatusOrder::from_cookies(&jar).apply(statuses);

    let nav_bar = NavBar::new(endpoints::DAY_VIEW).into_html();
    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="flex flex-wrap w-full justify-between items-end gap-4 mb-4"
            {
                div
                {
                    h1 class="text-2xl font-bold text-gray-900 dark:text-white" { "Day log" }
                    p class="text-gray-700 dark:text-gray-300"
                    {
                        "Worked hours: " (worked_hours_view(worked_hours, false))
                    }
                }

                form method="get" action=(endpoints::DAY_VIEW) class="flex items-end gap-2"
                {
                    div
                    {
                        label for="date" class=(FORM_LABEL_STYLE) { "Date" }
                        input id="date" type="date" name="date" value=(format_date(date))
                            class=(FORM_TEXT_INPUT_STYLE);
                    }

                    button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Show" }
                }
            }

            @if let Some(error) = date_error {
                p class="text-red-500 text-base mb-4" { (error) }
            }

            section id="time-entries" class={ "w-full " (CARD_STYLE) }
            {
                div class={ (ROW_GRID_STYLE) " " (TABLE_HEADER_STYLE) }
                {
                    span { "Hour" }
                    span { "Worked" }
                    span { "Comment" }
                    span { "Status" }
                    span {}
                }

                @for entry in day_rows(&entries) {
                    (time_entry_row(date, &entry, &statuses))
                }
            }
        }
    };

    Ok(base("Day log", &[], &content).into_response())
}

fn worked_hours_view(worked_hours: i64, out_of_band: bool) -> Markup {
    html! {
        span
            id=(WORKED_HOURS_ID)
            hx-swap-oob=[out_of_band.then_some("true")]
            class="font-semibold"
        {
            (worked_hours)
        }
    }
}

fn time_entry_row(date: Date, entry: &TimeEntry, statuses: &[Status]) -> Markup {
    let hour = entry.hour;
    let selected_status = entry.status_name();
    let unknown_status =
        selected_status.filter(|name| !statuses.iter().any(|status| status.name == *name));

    html! {
        form
            id={ "hour-" (hour) }
            hx-put=(format_endpoint(endpoints::DAY_ENTRY, format_date(date)))
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error={ "#" (ALERT_CONTAINER_ID) }
            class={ (ROW_GRID_STYLE) " border-b dark:border-gray-700" }
        {
            input type="hidden" name="hour" value=(hour);

            span class="text-gray-900 dark:text-white" { (format!("{hour}:00")) }

            input
                type="checkbox"
                name="worked"
                aria-label={ "Worked at " (hour) ":00" }
                checked[entry.worked]
                class=(FORM_CHECKBOX_STYLE);

            input
                type="text"
                name="comment"
                value=(entry.comment.as_deref().unwrap_or(""))
                aria-label={ "Comment for " (hour) ":00" }
                class=(FORM_TEXT_INPUT_STYLE);

            select
                name="status"
                aria-label={ "Status for " (hour) ":00" }
                class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" selected[selected_status.is_none()] { "—" }

                @for status in statuses {
                    option
                        value=(status.name)
                        selected[selected_status == Some(status.name.as_str())]
                    {
                        (status.name)
                    }
                }

                // Keep a deleted status visible until the entry is saved again.
                @if let Some(name) = unknown_status {
                    option value=(name) selected { (name) }
                }
            }

            button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Save" }
        }
    }
}

/// Save one hour of `date` and return the updated row with the new worked hours.
pub async fn save_time_entry_endpoint(
    Path(date): Path<String>,
    State(api): State<ApiClient>,
    Extension(session): Extension<Session>,
    jar: CookieJar,
    Form(form): Form<TimeEntryForm>,
) -> Response {
    let result = match (parse_date(&date), form.validate()) {
        (Ok(date), Ok(request)) => save_and_render(&api, &session, &jar, date, &request).await,
        (Err(error), _) | (_, Err(error)) => Err(error),
    };

    match result {
        Ok(markup) => markup.into_response(),
        Err(error) => {
            tracing::error!("Could not save time entry for {date} {}:00: {error}", form.hour);
            error.into_alert_response()
        }
    }
}

async fn save_and_render(
    api: &ApiClient,
    session: &Session,
    jar: &CookieJar,
    date: Date,
    request: &TimeEntryRequest,
) -> Result<Markup, Error> {
    let entry = save_time_entry(api, session, date, request).await?;
    tracing::info!("Saved time entry for {} {}:00", format_date(date), entry.hour);

    let (worked_hours, statuses) = tokio::try_join!(
        get_worked_hours(api, session, date),
        get_statuses(api, session),
    )?;
    let statuses = StatusOrder::from_cookies(jar).apply(statuses);
    let alert = Alert::SuccessSimple {
        message: format!("Saved {}:00", entry.hour),
    };

    Ok(html! {
        (time_entry_row(date, &entry, &statuses))
        (worked_hours_view(worked_hours, true))
        div id=(ALERT_CONTAINER_ID) hx-swap-oob="innerHTML" { (alert.into_html()) }
    })
}

#[cfg(test)]
mod day_page_tests {
    use axum::{
        Extension, Form, Json, Router,
        extract::{Path, Query, RawQuery, State},
        http::StatusCode,
        routing::get,
    };
    use axum_extra::extract::{CookieJar, cookie::Cookie};
    use serde_json::{Value, json};

    use crate::test_utils::{
        Recorder, assert_status_ok, assert_valid_html, count_elements, element_text, must_select,
        parse_html_document, parse_html_fragment, spawn_backend, test_client, test_session,
    };

    use super::{DayLogState, DayQuery, TimeEntryForm, get_day_page, save_time_entry_endpoint};

    fn backend(saved: Recorder<Value>, stats_queries: Recorder<String>) -> Router {
        Router::new()
            .route(
                "/api/days/{date}",
                get(|| async {
                    Json(json!([
                        {"hour": 9, "worked": true, "comment": "Stand-up",
                         "status": {"id": 2, "name": "Meeting"}},
                        {"hour": 13, "worked": false, "comment": null, "status": null}
                    ]))
                })
                .put(move |Path(date): Path<String>, Json(body): Json<Value>| async move {
                    saved.record(json!({"date": date, "body": body.clone()}));
                    Json(body)
                }),
            )
            .route(
                "/api/stats/daily",
                get(move |RawQuery(query): RawQuery| async move {
                    stats_queries.record(query.unwrap_or_default());
                    Json(json!(7))
                }),
            )
            .route(
                "/api/statuses/getAllStatuses",
                get(|| async {
                    Json(json!([{"id": 1, "name": "Work"}, {"id": 2, "name": "Meeting"}]))
                }),
            )
    }

    fn state(base_url: &str) -> DayLogState {
        DayLogState {
            api: test_client(base_url),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    #[tokio::test]
    async fn shows_24_rows_and_worked_hours() {
        let stats_queries = Recorder::default();
        let url = spawn_backend(backend(Recorder::default(), stats_queries.clone())).await;

        let response = get_day_page(
            State(state(&url)),
            Extension(test_session()),
            CookieJar::new().add(Cookie::new("status_order", "2,1")),
            Query(DayQuery {
                date: Some("2025-03-14".to_owned()),
            }),
        )
        .await
        .unwrap();

        assert_status_ok(&response);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        assert_eq!(count_elements(&document, "#time-entries form"), 24);
        assert_eq!(element_text(&must_select(&document, "#worked-hours")), "7");
        assert_eq!(stats_queries.last(), Some("date=2025-03-14".to_owned()));

        let nine = must_select(&document, "#hour-9");
        assert_eq!(nine.value().attr("hx-put"), Some("/api/days/2025-03-14"));
        assert_eq!(count_elements(&document, "#hour-9 input[name=worked][checked]"), 1);
        assert_eq!(count_elements(&document, "#hour-10 input[name=worked][checked]"), 0);
        let selected = must_select(&document, "#hour-9 option[selected]");
        assert_eq!(selected.value().attr("value"), Some("Meeting"));

        let options: Vec<_> = document
            .select(&scraper::Selector::parse("#hour-0 option").unwrap())
            .map(|option| element_text(&option))
            .collect();
        assert_eq!(options, ["—", "Meeting", "Work"]);
    }

    #[tokio::test]
    async fn invalid_date_falls_back_to_today_with_error() {
        let url = spawn_backend(backend(Recorder::default(), Recorder::default())).await;

        let response = get_day_page(
            State(state(&url)),
            Extension(test_session()),
            CookieJar::new(),
            Query(DayQuery {
                date: Some("yesterday".to_owned()),
            }),
        )
        .await
        .unwrap();

        let document = parse_html_document(response).await;
        let error = element_text(&must_select(&document, "main p.text-red-500"));
        assert!(error.contains("yesterday"), "got {error:?}");
        assert_eq!(count_elements(&document, "#time-entries form"), 24);
    }

    #[tokio::test]
    async fn saving_returns_row_and_updated_worked_hours() {
        let saved = Recorder::default();
        let url = spawn_backend(backend(saved.clone(), Recorder::default())).await;

        let response = save_time_entry_endpoint(
            Path("2025-03-14".to_owned()),
            State(test_client(&url)),
            Extension(test_session()),
            CookieJar::new(),
            Form(TimeEntryForm {
                hour: "10".to_owned(),
                worked: Some("on".to_owned()),
                comment: "Review".to_owned(),
                status: "Work".to_owned(),
            }),
        )
        .await;

        assert_status_ok(&response);
        assert_eq!(
            saved.last(),
            Some(json!({
                "date": "2025-03-14",
                "body": {"hour": 10, "worked": true, "comment": "Review",
                         "status": {"name": "Work"}}
            }))
        );

        let html = parse_html_fragment(response).await;
        assert_eq!(count_elements(&html, "form#hour-10 input[name=worked][checked]"), 1);
        let worked_hours = must_select(&html, "#worked-hours");
        assert_eq!(worked_hours.value().attr("hx-swap-oob"), Some("true"));
        assert_eq!(element_text(&worked_hours), "7");
    }

    #[tokio::test]
    async fn out_of_range_hour_gets_alert_without_saving() {
        let saved = Recorder::default();
        let url = spawn_backend(backend(saved.clone(), Recorder::default())).await;

        let response = save_time_entry_endpoint(
            Path("2025-03-14".to_owned()),
            State(test_client(&url)),
            Extension(test_session()),
            CookieJar::new(),
            Form(TimeEntryForm {
                hour: "300".to_owned(),
                ..Default::default()
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(saved.all().is_empty());
        let html = parse_html_fragment(response).await;
        assert_eq!(
            element_text(&must_select(&html, "div[role=alert] p.text-sm")),
            "Hour must be between 0 and 23"
        );
    }

    #[tokio::test]
    async fn saving_with_bad_date_is_rejected() {
        let response = save_time_entry_endpoint(
            Path("14/03/2025".to_owned()),
            State(test_client("http://127.0.0.1:9")),
            Extension(test_session()),
            CookieJar::new(),
            Form(TimeEntryForm::default()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
