use actix_identity::Identity;
use actix_web::{
    get,
    http::{header, StatusCode},
    post,
    web::{self, Data},
    HttpMessage, HttpRequest, HttpResponse, Responder,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    db,
    errors::AppError,
    forms::{InvoiceErrors, InvoiceForm, Login, Signup, SignupErrors, ValidInvoice, MIN_PASSWORD_LEN},
    seed,
    structs::InvoiceStatus,
    ui::{base_context, render_page, render_page_with_status},
    utils::verify_password,
    AppState,
};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(index_handler)
        .service(login_handler)
        .service(login_form_handler)
        .service(signup_handler)
        .service(signup_form_handler)
        .service(logout_handler)
        .service(dashboard_handler)
        .service(customers_handler)
        .service(invoices_handler)
        .service(create_invoice_handler)
        .service(create_invoice_form_handler)
        .service(edit_invoice_handler)
        .service(edit_invoice_form_handler)
        .service(delete_invoice_handler)
        .service(stocks_handler)
        .service(currencies_handler)
        .service(admin_handler)
        .service(seed_handler);
}

/// Email of the signed-in user, if the session carries one.
fn current_email(identity: &Option<Identity>) -> Option<String> {
    identity.as_ref().and_then(|id| id.id().ok())
}

/// The insert hit a `UNIQUE` constraint, e.g. an email that is already registered.
fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error().is_some_and(|d| d.is_unique_violation())
}

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .append_header((header::LOCATION, location))
        .finish()
}

#[derive(Deserialize, Debug, Default)]
pub struct SearchParams {
    query: Option<String>,
    page: Option<i64>,
}

impl SearchParams {
    fn query(&self) -> &str {
        self.query.as_deref().unwrap_or("").trim()
    }
}

#[get("/")]
pub async fn index_handler() -> Result<impl Responder, AppError> {
    let context = base_context("Welcome", None);
    render_page("index.html", &context)
}

fn login_page(status: StatusCode, email: &str, message: Option<&str>) -> Result<HttpResponse, AppError> {
    let mut context = base_context("Log in", None);
    context.insert("email", email);
    context.insert("message", &message);
    context.insert("pending", &false);
    context.insert("min_password_len", &MIN_PASSWORD_LEN);
    render_page_with_status(status, "login.html", &context)
}

#[get("/login")]
pub async fn login_handler() -> Result<impl Responder, AppError> {
    login_page(StatusCode::OK, "", None)
}

#[post("/login")]
pub async fn login_form_handler(
    web::Form(form): web::Form<Login>,
    state: Data<AppState>,
    request: HttpRequest,
) -> Result<impl Responder, AppError> {
    let email = form.normalized_email();
    if email.is_empty() || form.password.is_empty() {
        return login_page(StatusCode::BAD_REQUEST, &email, Some("All fields are required."));
    }

    let user = db::get_user_by_email(&state, &email).await.map_err(|e| {
        log::error!("Failed to look up user: {}", e);
        AppError::DatabaseError(e)
    })?;

    let authenticated = match &user {
        Some(user) => verify_password(&form.password, &user.password)?,
        None => false,
    };
    if !authenticated {
        log::warn!("Failed sign-in attempt for {}", email);
        return login_page(StatusCode::UNAUTHORIZED, &email, Some("Invalid credentials."));
    }

    Identity::login(&request.extensions(), email.clone()).map_err(|e| {
        log::error!("Failed to attach identity: {}", e);
        AppError::IdentityError(e.to_string())
    })?;
    log::info!("User signed in: {}", email);

    Ok(see_other("/dashboard"))
}

fn signup_page(
    status: StatusCode,
    name: &str,
    email: &str,
    errors: &SignupErrors,
    message: Option<&str>,
) -> Result<HttpResponse, AppError> {
    let mut context = base_context("Sign up", None);
    context.insert("form", &json!({ "name": name, "email": email }));
    context.insert("errors", errors);
    context.insert("message", &message);
    context.insert("pending", &false);
    context.insert("min_password_len", &MIN_PASSWORD_LEN);
    render_page_with_status(status, "signup.html", &context)
}

#[get("/signup")]
pub async fn signup_handler() -> Result<impl Responder, AppError> {
    signup_page(StatusCode::OK, "", "", &SignupErrors::default(), None)
}

/// Creates the account and signs the new user in. Validation runs before
/// anything touches the database.
#[post("/signup")]
pub async fn signup_form_handler(
    web::Form(form): web::Form<Signup>,
    state: Data<AppState>,
    request: HttpRequest,
) -> Result<impl Responder, AppError> {
    let valid = match form.validate() {
        Ok(valid) => valid,
        Err(errors) => {
            return signup_page(
                StatusCode::BAD_REQUEST,
                &form.name,
                &form.email,
                &errors,
                Some("Missing or invalid fields. Failed to create account."),
            );
        }
    };

    let (name, email) = (valid.name.clone(), valid.email.clone());
    let user = match db::create_user(&state, valid.name, valid.email, valid.password).await {
        Ok(user) => user,
        Err(AppError::DatabaseError(e)) if is_unique_violation(&e) => {
            log::warn!("Sign-up with an email already in use: {}", email);
            let errors = SignupErrors {
                email: vec!["An account with this email already exists".to_owned()],
                ..SignupErrors::default()
            };
            return signup_page(StatusCode::CONFLICT, &name, &email, &errors, None);
        }
        Err(e) => return Err(e),
    };

    Identity::login(&request.extensions(), user.email.clone()).map_err(|e| {
        log::error!("Failed to attach identity: {}", e);
        AppError::IdentityError(e.to_string())
    })?;

    Ok(see_other("/dashboard"))
}

#[post("/dashboard/logout")]
pub async fn logout_handler(user: Identity) -> impl Responder {
    user.logout();
    see_other("/login")
}

#[get("/dashboard")]
pub async fn dashboard_handler(
    state: Data<AppState>,
    identity: Option<Identity>,
) -> Result<impl Responder, AppError> {
    let cards = db::fetch_card_data(&state).await.map_err(|e| {
        log::error!("Failed to fetch card data: {}", e);
        AppError::DatabaseError(e)
    })?;
    let revenue = db::fetch_revenue(&state).await.map_err(|e| {
        log::error!("Failed to fetch revenue: {}", e);
        AppError::DatabaseError(e)
    })?;
    let latest_invoices = db::fetch_latest_invoices(&state).await.map_err(|e| {
        log::error!("Failed to fetch latest invoices: {}", e);
        AppError::DatabaseError(e)
    })?;

    let email = current_email(&identity);
    let mut context = base_context("Dashboard", email.as_deref());
    context.insert("cards", &cards);
    context.insert("revenue", &revenue);
    context.insert("latest_invoices", &latest_invoices);
    render_page("dashboard/index.html", &context)
}

#[get("/dashboard/customers")]
pub async fn customers_handler(
    state: Data<AppState>,
    identity: Option<Identity>,
    params: web::Query<SearchParams>,
) -> Result<impl Responder, AppError> {
    let query = params.query();
    let customers = db::fetch_filtered_customers(&state, query).await.map_err(|e| {
        log::error!("Failed to fetch customers: {}", e);
        AppError::DatabaseError(e)
    })?;

    let email = current_email(&identity);
    let mut context = base_context("Customers", email.as_deref());
    context.insert("query", query);
    context.insert("customers", &customers);
    render_page("dashboard/customers.html", &context)
}

#[get("/dashboard/invoices")]
pub async fn invoices_handler(
    state: Data<AppState>,
    identity: Option<Identity>,
    params: web::Query<SearchParams>,
) -> Result<impl Responder, AppError> {
    let query = params.query();
    let total_pages = db::fetch_invoice_pages(&state, query).await.map_err(|e| {
        log::error!("Failed to count invoices: {}", e);
        AppError::DatabaseError(e)
    })?;
    let current_page = params.page.unwrap_or(1).clamp(1, total_pages.max(1));
    let invoices = db::fetch_filtered_invoices(&state, query, current_page)
        .await
        .map_err(|e| {
            log::error!("Failed to fetch invoices: {}", e);
            AppError::DatabaseError(e)
        })?;

    let email = current_email(&identity);
    let mut context = base_context("Invoices", email.as_deref());
    context.insert("query", query);
    context.insert("invoices", &invoices);
    context.insert("current_page", &current_page);
    context.insert("pages", &(1..=total_pages).collect::<Vec<_>>());
    context.insert("paginate", &(total_pages > 1));
    render_page("dashboard/invoices.html", &context)
}

struct InvoiceFormPage<'a> {
    title: &'a str,
    action: String,
    submit_label: &'a str,
    form: &'a InvoiceForm,
    errors: &'a InvoiceErrors,
    message: Option<&'a str>,
}

async fn invoice_form_page(
    state: &AppState,
    identity: &Option<Identity>,
    status: StatusCode,
    page: InvoiceFormPage<'_>,
) -> Result<HttpResponse, AppError> {
    let customers = db::fetch_customer_names(state).await.map_err(|e| {
        log::error!("Failed to fetch customers: {}", e);
        AppError::DatabaseError(e)
    })?;
    let statuses: Vec<&str> = InvoiceStatus::ALL.iter().map(|s| s.as_str()).collect();

    let email = current_email(identity);
    let mut context = base_context(page.title, email.as_deref());
    context.insert("action", &page.action);
    context.insert("submit_label", page.submit_label);
    context.insert("customers", &customers);
    context.insert("statuses", &statuses);
    context.insert("form", page.form);
    context.insert("errors", page.errors);
    context.insert("message", &page.message);
    context.insert("pending", &false);
    render_page_with_status(status, "dashboard/invoice_form.html", &context)
}

const INVOICE_FORM_MESSAGE: &str = "Missing Fields. Failed to save invoice.";

/// Validates the form and checks the customer exists. Errors come back per field.
async fn validated_invoice(
    state: &AppState,
    form: &InvoiceForm,
) -> Result<Result<ValidInvoice, InvoiceErrors>, AppError> {
    let valid = match form.validate() {
        Ok(valid) => valid,
        Err(errors) => return Ok(Err(errors)),
    };
    let exists = db::customer_exists(state, &valid.customer_id).await.map_err(|e| {
        log::error!("Failed to check customer: {}", e);
        AppError::DatabaseError(e)
    })?;
    if !exists {
        return Ok(Err(InvoiceErrors {
            customer_id: vec!["Customer not found.".to_owned()],
            ..InvoiceErrors::default()
        }));
    }
    Ok(Ok(valid))
}

#[get("/dashboard/invoices/create")]
pub async fn create_invoice_handler(
    state: Data<AppState>,
    identity: Option<Identity>,
) -> Result<impl Responder, AppError> {
    let form = InvoiceForm::default();
    invoice_form_page(
        &state,
        &identity,
        StatusCode::OK,
        InvoiceFormPage {
            title: "Create Invoice",
            action: "/dashboard/invoices/create".to_owned(),
            submit_label: "Create Invoice",
            form: &form,
            errors: &InvoiceErrors::default(),
            message: None,
        },
    )
    .await
}

#[post("/dashboard/invoices/create")]
pub async fn create_invoice_form_handler(
    web::Form(form): web::Form<InvoiceForm>,
    state: Data<AppState>,
    identity: Option<Identity>,
) -> Result<impl Responder, AppError> {
    let valid = match validated_invoice(&state, &form).await? {
        Ok(valid) => valid,
        Err(errors) => {
            return invoice_form_page(
                &state,
                &identity,
                StatusCode::BAD_REQUEST,
                InvoiceFormPage {
                    title: "Create Invoice",
                    action: "/dashboard/invoices/create".to_owned(),
                    submit_label: "Create Invoice",
                    form: &form,
                    errors: &errors,
                    message: Some(INVOICE_FORM_MESSAGE),
                },
            )
            .await;
        }
    };

    db::create_invoice(&state, &valid.customer_id, valid.amount, valid.status)
        .await
        .map_err(|e| {
            log::error!("Failed to create invoice: {}", e);
            AppError::DatabaseError(e)
        })?;

    Ok(see_other("/dashboard/invoices"))
}

#[get("/dashboard/invoices/{id}/edit")]
pub async fn edit_invoice_handler(
    state: Data<AppState>,
    identity: Option<Identity>,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let id = path.into_inner();
    let invoice = db::fetch_invoice_by_id(&state, &id)
        .await
        .map_err(|e| {
            log::error!("Failed to fetch invoice {}: {}", id, e);
            AppError::DatabaseError(e)
        })?
        .ok_or(AppError::NotFound)?;

    let form = InvoiceForm {
        customer_id: invoice.customer_id,
        amount: format!("{:.2}", invoice.amount as f64 / 100.0),
        status: invoice.status,
    };
    invoice_form_page(
        &state,
        &identity,
        StatusCode::OK,
        InvoiceFormPage {
            title: "Edit Invoice",
            action: format!("/dashboard/invoices/{}/edit", id),
            submit_label: "Edit Invoice",
            form: &form,
            errors: &InvoiceErrors::default(),
            message: None,
        },
    )
    .await
}

#[post("/dashboard/invoices/{id}/edit")]
pub async fn edit_invoice_form_handler(
    web::Form(form): web::Form<InvoiceForm>,
    state: Data<AppState>,
    identity: Option<Identity>,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let id = path.into_inner();
    let valid = match validated_invoice(&state, &form).await? {
        Ok(valid) => valid,
        Err(errors) => {
            return invoice_form_page(
                &state,
                &identity,
                StatusCode::BAD_REQUEST,
                InvoiceFormPage {
                    title: "Edit Invoice",
                    action: format!("/dashboard/invoices/{}/edit", id),
                    submit_label: "Edit Invoice",
                    form: &form,
                    errors: &errors,
                    message: Some(INVOICE_FORM_MESSAGE),
                },
            )
            .await;
        }
    };

    db::update_invoice(&state, &id, &valid.customer_id, valid.amount, valid.status)
        .await
        .map_err(|e| {
            log::error!("Failed to update invoice {}: {}", id, e);
            AppError::DatabaseError(e)
        })?
        .ok_or(AppError::NotFound)?;

    Ok(see_other("/dashboard/invoices"))
}

#[post("/dashboard/invoices/{id}/delete")]
pub async fn delete_invoice_handler(
    state: Data<AppState>,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let id = path.into_inner();
    let deleted = db::delete_invoice(&state, &id).await.map_err(|e| {
        log::error!("Failed to delete invoice {}: {}", id, e);
        AppError::DatabaseError(e)
    })?;
    if !deleted {
        return Err(AppError::NotFound);
    }
    Ok(see_other("/dashboard/invoices"))
}

#[get("/dashboard/stocks")]
pub async fn stocks_handler(
    state: Data<AppState>,
    identity: Option<Identity>,
    params: web::Query<SearchParams>,
) -> Result<impl Responder, AppError> {
    let query = params.query();
    let stocks = db::fetch_filtered_stocks(&state, query).await.map_err(|e| {
        log::error!("Failed to fetch stocks: {}", e);
        AppError::DatabaseError(e)
    })?;

    let email = current_email(&identity);
    let mut context = base_context("Stocks", email.as_deref());
    context.insert("query", query);
    context.insert("stocks", &stocks);
    render_page("dashboard/stocks.html", &context)
}

#[get("/dashboard/currencies")]
pub async fn currencies_handler(
    state: Data<AppState>,
    identity: Option<Identity>,
) -> Result<impl Responder, AppError> {
    let currencies = db::fetch_currencies(&state).await.map_err(|e| {
        log::error!("Failed to fetch currencies: {}", e);
        AppError::DatabaseError(e)
    })?;

    let email = current_email(&identity);
    let mut context = base_context("Currencies", email.as_deref());
    context.insert("currencies", &currencies);
    render_page("dashboard/currencies.html", &context)
}

#[get("/admin")]
pub async fn admin_handler(
    state: Data<AppState>,
    identity: Option<Identity>,
) -> Result<impl Responder, AppError> {
    let users = db::get_all_users(&state).await.map_err(|e| {
        log::error!("Failed to get users: {}", e);
        AppError::DatabaseError(e)
    })?;

    let email = current_email(&identity);
    let mut context = base_context("Users", email.as_deref());
    context.insert("users", &users);
    render_page("admin/users.html", &context)
}

/// Maintenance endpoint: creates tables and inserts the placeholder rows.
#[get("/seed")]
pub async fn seed_handler(state: Data<AppState>) -> Result<impl Responder, AppError> {
    seed::seed_database(&state.db_pool).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Database seeded successfully" })))
}
