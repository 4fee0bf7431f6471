use axum::{http::header, response::Html, response::IntoResponse};

const INDEX_HTML: &str = include_str!("../templates/index.html");
const SCRATCHPAD_HTML: &str = include_str!("../templates/scratchpad.html");
const CALCULATOR_HTML: &str = include_str!("../templates/calculator.html");
const PASSWORD_HTML: &str = include_str!("../templates/password.html");
const TASK_JS: &str = include_str!("../static/js/task.js");

pub(crate) async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub(crate) async fn scratchpad() -> Html<&'static str> {
    Html(SCRATCHPAD_HTML)
}

pub(crate) async fn calculator() -> Html<&'static str> {
    Html(CALCULATOR_HTML)
}

pub(crate) async fn password() -> Html<&'static str> {
    Html(PASSWORD_HTML)
}

pub(crate) async fn task_script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        TASK_JS,
    )
}
