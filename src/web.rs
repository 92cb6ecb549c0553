//! Single-page form front end.
//!
//! `GET /` renders an empty question form; `POST /` normalizes the submitted
//! question, asks the provider and re-renders the same page with the results.

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::{Form, State};
use axum::response::Html;
use axum::routing::get;
use serde::Deserialize;
use std::fmt::Write as _;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::normalize::{Normalized, normalize};
use crate::query::{QueryClient, QueryOutcome};
use crate::transport::Transport;

#[derive(Debug, Default, Deserialize)]
pub struct QuestionForm {
    #[serde(default)]
    pub question: Option<String>,
}

/// Everything the page shows after a submission.
#[derive(Debug, Default)]
struct PageView<'a> {
    question: Option<&'a str>,
    normalized: Option<Normalized>,
    answer: Option<QueryOutcome>,
}

pub fn router<T>(client: Arc<QueryClient<T>>) -> Router
where
    T: Transport + 'static,
{
    Router::new()
        .route("/", get(show_form).post(submit_question::<T>))
        .with_state(client)
        .layer(TraceLayer::new_for_http())
}

pub async fn serve<T>(bind_addr: &str, client: Arc<QueryClient<T>>) -> Result<()>
where
    T: Transport + 'static,
{
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind web server to '{bind_addr}'"))?;
    let local_addr = listener
        .local_addr()
        .context("Failed to read web server address")?;
    info!(url = %format!("http://{local_addr}"), "web server ready");

    axum::serve(listener, router(client))
        .await
        .context("Web server failed")
}

async fn show_form() -> Html<String> {
    Html(render_page(&PageView::default()))
}

async fn submit_question<T>(
    State(client): State<Arc<QueryClient<T>>>,
    Form(form): Form<QuestionForm>,
) -> Html<String>
where
    T: Transport + 'static,
{
    let Some(question) = form.question.as_deref().filter(|q| !q.trim().is_empty()) else {
        debug!("blank question submitted, rendering empty form");
        return Html(render_page(&PageView::default()));
    };

    let normalized = normalize(question);
    let answer = client.query(question, None).await;
    debug!(
        token_count = normalized.tokens.len(),
        answered = answer.is_answer(),
        "handled question"
    );

    Html(render_page(&PageView {
        question: Some(question),
        normalized: Some(normalized),
        answer: Some(answer),
    }))
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn render_results(view: &PageView<'_>) -> String {
    let mut out = String::new();
    if let Some(question) = view.question {
        let _ = write!(
            out,
            "<section class=\"result\"><h2>Your question</h2><p>{}</p></section>",
            escape_html(question)
        );
    }
    if let Some(normalized) = &view.normalized {
        let tokens = normalized
            .tokens
            .iter()
            .map(|token| format!("<li>{}</li>", escape_html(token)))
            .collect::<String>();
        let _ = write!(
            out,
            "<section class=\"result\"><h2>Processed text</h2><p>{}</p>\
             <h2>Tokens</h2><ul class=\"tokens\">{}</ul></section>",
            escape_html(&normalized.text),
            tokens
        );
    }
    if let Some(answer) = &view.answer {
        let _ = write!(
            out,
            "<section class=\"answer\"><h2>LLM Answer</h2><pre>{}</pre></section>",
            escape_html(&answer.to_string())
        );
    }
    out
}

fn render_page(view: &PageView<'_>) -> String {
    let question = view.question.map(escape_html).unwrap_or_default();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>NLP Question-Answering System</title>
<style>
body {{ font-family: sans-serif; max-width: 48rem; margin: 2rem auto; }}
textarea {{ width: 100%; }}
.tokens li {{ display: inline; margin-right: 0.5rem; }}
pre {{ white-space: pre-wrap; background: #f4f4f4; padding: 1rem; }}
</style>
</head>
<body>
<h1>NLP Question-Answering System</h1>
<form method="post" action="/">
<label for="question">Enter your question:</label>
<textarea id="question" name="question" rows="3">{question}</textarea>
<button type="submit">Ask</button>
</form>
{results}
</body>
</html>
"#,
        results = render_results(view)
    )
}
