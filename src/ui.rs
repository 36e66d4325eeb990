use actix_web::{http::StatusCode, HttpResponse};
use tera::Context;

use crate::{auth::ADMIN_EMAIL, errors::AppError, TEMPLATES};

/// Context every page starts from.
pub fn base_context(title: &str, identity: Option<&str>) -> Context {
    let mut context = Context::new();
    context.insert("title", title);
    context.insert("version", env!("CARGO_PKG_VERSION"));
    context.insert("identity", &identity);
    context.insert("is_admin", &(identity == Some(ADMIN_EMAIL)));
    context
}

pub fn render_page(template: &str, context: &Context) -> Result<HttpResponse, AppError> {
    render_page_with_status(StatusCode::OK, template, context)
}

pub fn render_page_with_status(
    status: StatusCode,
    template: &str,
    context: &Context,
) -> Result<HttpResponse, AppError> {
    let rendered = TEMPLATES.render(template, context).map_err(|e| {
        log::error!("Failed to render template {}: {}", template, e);
        AppError::TemplateError(e)
    })?;

    Ok(HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(rendered))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Renders `body` against the shared macros, the way every page imports them.
    fn render_with_macros(body: &str, context: &Context) -> String {
        let mut tera = TEMPLATES.clone();
        tera.add_raw_template(
            "macro_call.html",
            &format!("{{% import \"components/macros.html\" as ui %}}{}", body),
        )
        .unwrap();
        tera.render("macro_call.html", context).unwrap()
    }

    fn error_list(errors: Option<&[String]>) -> String {
        let mut context = Context::new();
        context.insert("errors", &errors);
        render_with_macros(r#"{{ ui::error_list(elemid="signup-error", errors=errors) }}"#, &context)
    }

    #[test]
    fn error_list_renders_one_paragraph_per_error_in_order() {
        let errors = vec!["Email required".to_owned(), "Password too short".to_owned()];
        let html = error_list(Some(errors.as_slice()));

        assert_eq!(html.matches("<p").count(), 2);
        let first = html.find("Email required").unwrap();
        let second = html.find("Password too short").unwrap();
        assert!(first < second);
        assert!(html.contains("id=\"signup-error\""));
    }

    #[test]
    fn missing_error_list_renders_nothing() {
        assert_eq!(error_list(None).matches("<p").count(), 0);

        let empty: Vec<String> = Vec::new();
        assert_eq!(error_list(Some(empty.as_slice())).matches("<p").count(), 0);
    }

    #[test]
    fn error_text_is_escaped() {
        let errors = vec!["<script>alert(1)</script>".to_owned()];
        let html = error_list(Some(errors.as_slice()));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn pending_form_disables_the_button() {
        let call = r#"{{ ui::submit_button(label="Sign up", pending=pending) }}{{ ui::inline_error(message=message) }}"#;

        let mut context = Context::new();
        context.insert("pending", &false);
        context.insert("message", &None::<String>);
        let idle = render_with_macros(call, &context);
        assert!(!idle.contains("aria-disabled"));
        assert!(!idle.contains("spinner"));
        assert_eq!(idle.matches("<p").count(), 0);

        context.insert("pending", &true);
        context.insert("message", "Something went wrong.");
        let pending = render_with_macros(call, &context);
        assert!(pending.contains("aria-disabled=\"true\""));
        assert!(pending.contains("spinner"));
        assert!(pending.contains("Something went wrong."));
    }

    #[test]
    fn base_context_flags_the_admin() {
        let context = base_context("Admin", Some(ADMIN_EMAIL));
        assert_eq!(context.get("is_admin"), Some(&serde_json::Value::Bool(true)));
        let context = base_context("Home", None);
        assert_eq!(context.get("is_admin"), Some(&serde_json::Value::Bool(false)));
    }
}
