use axum::extract::{Form, Path, Query, State};
use axum::http::{header, HeaderMap};
use axum::response::{AppendHeaders, Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::{Local, NaiveDate};
use serde::Deserialize;

use crate::auth::{self, AuthUser, SessionUser};
use crate::db::ProductInput;
use crate::error::{AppError, AppResult};
use crate::export;
use crate::model::{AppState, Batch, ProductStock, Role, User};
use crate::scan::{self, ScanMode, ScanOutcome};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/login", get(login_page).post(login_submit))
        .route("/logout", get(logout))
        .route("/dashboard", get(dashboard))
        .route("/inventory", get(inventory))
        .route("/scan/:mode", get(scan_page))
        .route("/handle_scan", get(handle_scan))
        .route("/product/new", get(product_new_page).post(product_create))
        .route("/product/:id", get(product_detail).post(product_detail))
        .route("/product/:id/edit", get(product_edit_page).post(product_edit))
        .route("/product/:id/delete", post(product_delete))
        .route("/add_batch/:product_id", post(add_batch))
        .route("/use_batch/:batch_id", post(use_batch))
        .route("/admin/users", get(admin_users_page).post(admin_users_submit))
        .route("/export_csv", get(export_csv))
        .with_state(state)
}

// --- Query / form payloads ---

#[derive(Deserialize)]
struct NoticeQuery {
    notice: Option<String>,
}

#[derive(Deserialize)]
struct ScanQuery {
    code: Option<String>,
    mode: Option<String>,
}

#[derive(Deserialize)]
struct NewProductQuery {
    code: Option<String>,
}

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

#[derive(Deserialize)]
struct ProductForm {
    barcode: String,
    name: String,
    brand: Option<String>,
    supplier: Option<String>,
    unit_measure: Option<String>,
    unit_price: Option<String>,
}

#[derive(Deserialize)]
struct AddBatchForm {
    quantity: String,
    expiry_date: Option<String>,
}

#[derive(Deserialize)]
struct UseBatchForm {
    quantity_use: String,
}

#[derive(Deserialize)]
struct UserAdminForm {
    action: String,
    username: Option<String>,
    password: Option<String>,
    role: Option<String>,
    user_id: Option<String>,
}

// --- Input parsing ---

/// Unit price is parsed leniently: anything unparseable or negative falls
/// back to 0.0 instead of rejecting the request.
fn parse_price(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|p| p.is_finite() && *p >= 0.0)
        .unwrap_or(0.0)
}

/// Quantities are parsed strictly; positivity is enforced again by the store.
fn parse_quantity(raw: &str) -> AppResult<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| AppError::InvalidInput(format!("quantità non valida: {}", raw.trim())))
}

/// Expiry dates are strict `YYYY-MM-DD`; an empty field means no expiry.
fn parse_expiry(raw: Option<&str>) -> AppResult<Option<NaiveDate>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| AppError::InvalidInput(format!("data di scadenza non valida: {s}"))),
    }
}

fn product_input(form: ProductForm) -> ProductInput {
    let unit_price = parse_price(form.unit_price.as_deref());
    ProductInput {
        barcode: form.barcode.trim().to_string(),
        name: form.name.trim().to_string(),
        brand: form.brand.unwrap_or_default().trim().to_string(),
        supplier: form.supplier.unwrap_or_default().trim().to_string(),
        unit_measure: form.unit_measure.unwrap_or_default().trim().to_string(),
        unit_price,
    }
}

// --- Small view helpers (full templating is out of scope) ---

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.as_bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(*b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

fn redirect_notice(path: &str, notice: &str) -> Redirect {
    Redirect::to(&format!("{path}?notice={}", urlencode(notice)))
}

fn page(title: &str, notice: Option<&str>, body: &str) -> Html<String> {
    let notice_html = notice
        .map(|n| format!("<p><em>{}</em></p>", escape(n)))
        .unwrap_or_default();
    Html(format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title></head>\
         <body><h1>{}</h1>{notice_html}{body}</body></html>",
        escape(title),
        escape(title),
    ))
}

fn batch_rows(batches: &[Batch]) -> String {
    batches
        .iter()
        .map(|b| {
            let expiry = b
                .expiry_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string());
            format!(
                "<tr><td>{}</td><td>{} / {}</td><td>{}</td><td>{}</td><td>{}</td>\
                 <td><form method=\"post\" action=\"/use_batch/{}\">\
                 <input name=\"quantity_use\"><button>Scarica</button></form></td></tr>",
                b.id,
                b.quantity_current,
                b.quantity_initial,
                b.entry_date.format("%Y-%m-%d"),
                expiry,
                escape(&b.created_by),
                b.id,
            )
        })
        .collect()
}

fn stock_rows(rows: &[ProductStock]) -> String {
    rows.iter()
        .map(|s| {
            format!(
                "<tr><td>{}</td><td><a href=\"/product/{}\">{}</a></td><td>{}</td>\
                 <td>{} {}</td><td>{}</td></tr>",
                escape(&s.product.barcode),
                s.product.id,
                escape(&s.product.name),
                escape(&s.product.brand),
                s.total_quantity,
                escape(&s.product.unit_measure),
                s.product.unit_price,
            )
        })
        .collect()
}

fn user_rows(users: &[User]) -> String {
    users
        .iter()
        .map(|u| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td>\
                 <td><form method=\"post\" action=\"/admin/users\">\
                 <input type=\"hidden\" name=\"action\" value=\"delete\">\
                 <input type=\"hidden\" name=\"user_id\" value=\"{}\">\
                 <button>Elimina</button></form></td></tr>",
                u.id,
                escape(&u.username),
                u.role.as_str(),
                u.id,
            )
        })
        .collect()
}

// --- Session handlers ---

async fn index(_user: AuthUser) -> Redirect {
    Redirect::to("/dashboard")
}

async fn login_page(Query(q): Query<NoticeQuery>) -> Html<String> {
    page(
        "Login",
        q.notice.as_deref(),
        "<form method=\"post\" action=\"/login\">\
         <input name=\"username\" placeholder=\"Username\">\
         <input name=\"password\" type=\"password\" placeholder=\"Password\">\
         <button>Entra</button></form>",
    )
}

async fn login_submit(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    match auth::authenticate(&state.db, &form.username, &form.password)? {
        Some(user) => {
            log::info!("user {} logged in", user.username);
            let token = state.sessions.create(SessionUser {
                user_id: user.id,
                username: user.username,
                role: user.role,
            });
            Ok((
                AppendHeaders([(header::SET_COOKIE, auth::set_session_cookie(&token))]),
                Redirect::to("/dashboard"),
            )
                .into_response())
        }
        None => {
            log::warn!("failed login attempt for {}", form.username);
            Ok(redirect_notice("/login", "Credenziali non valide").into_response())
        }
    }
}

async fn logout(State(state): State<AppState>, _user: AuthUser, headers: HeaderMap) -> Response {
    if let Some(token) = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(auth::session_token)
    {
        state.sessions.remove(token);
    }
    (
        AppendHeaders([(header::SET_COOKIE, auth::clear_session_cookie())]),
        Redirect::to("/login"),
    )
        .into_response()
}

// --- Dashboard and inventory ---

async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
    Query(q): Query<NoticeQuery>,
) -> AppResult<Html<String>> {
    let admin_links = if user.0.role.is_admin() {
        "<li><a href=\"/admin/users\">Gestione utenti</a></li>"
    } else {
        ""
    };
    let logs = state.db.recent_logs(10)?;
    let log_rows: String = logs
        .iter()
        .map(|l| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                l.timestamp.format("%Y-%m-%d %H:%M"),
                escape(&l.username),
                l.action.as_str(),
                escape(&l.product_name),
                l.quantity_change,
            )
        })
        .collect();
    let body = format!(
        "<p>Utente: {}</p><ul>\
         <li><a href=\"/scan/in\">Carico merce</a></li>\
         <li><a href=\"/scan/out\">Scarico merce</a></li>\
         <li><a href=\"/inventory\">Inventario</a></li>\
         <li><a href=\"/export_csv\">Esporta CSV</a></li>\
         {admin_links}\
         <li><a href=\"/logout\">Logout</a></li></ul>\
         <h2>Ultime operazioni</h2>\
         <table><tr><th>Quando</th><th>Chi</th><th>Azione</th><th>Prodotto</th>\
         <th>Quantità</th></tr>{log_rows}</table>",
        escape(user.username()),
    );
    Ok(page("Dashboard", q.notice.as_deref(), &body))
}

async fn inventory(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(q): Query<NoticeQuery>,
) -> AppResult<Html<String>> {
    let rows = state.db.list_stock()?;
    let body = format!(
        "<p><a href=\"/product/new\">Nuovo prodotto</a></p>\
         <table><tr><th>Codice</th><th>Prodotto</th><th>Marca</th>\
         <th>Giacenza</th><th>Prezzo</th></tr>{}</table>",
        stock_rows(&rows),
    );
    Ok(page("Inventario", q.notice.as_deref(), &body))
}

// --- Scan flow ---

async fn scan_page(_user: AuthUser, Path(mode): Path<String>) -> Response {
    let Some(mode) = ScanMode::parse(&mode) else {
        return Redirect::to("/dashboard").into_response();
    };
    let title = match mode {
        ScanMode::In => "Carico merce",
        ScanMode::Out => "Scarico merce",
    };
    let body = format!(
        "<form method=\"get\" action=\"/handle_scan\">\
         <input name=\"code\" placeholder=\"Codice a barre\" autofocus>\
         <input type=\"hidden\" name=\"mode\" value=\"{}\">\
         <button>Cerca</button></form>",
        mode.as_str(),
    );
    page(title, None, &body).into_response()
}

async fn handle_scan(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(q): Query<ScanQuery>,
) -> AppResult<Redirect> {
    let code = q.code.unwrap_or_default();
    let mode = q.mode.as_deref().and_then(ScanMode::parse);
    let product_id = if code.is_empty() {
        None
    } else {
        state.db.find_product_by_barcode(&code)?.map(|p| p.id)
    };
    Ok(match scan::dispatch(mode, &code, product_id) {
        ScanOutcome::ProductDetail(id) => Redirect::to(&format!("/product/{id}")),
        ScanOutcome::CreateProduct(code) => {
            Redirect::to(&format!("/product/new?code={}", urlencode(&code)))
        }
        ScanOutcome::UnknownProduct => {
            redirect_notice("/dashboard", "Prodotto non trovato in magazzino!")
        }
        ScanOutcome::Dashboard => Redirect::to("/dashboard"),
    })
}

// --- Product lifecycle ---

fn product_form_fields(existing: Option<&ProductInput>, code: &str) -> String {
    let blank = ProductInput {
        barcode: code.to_string(),
        name: String::new(),
        brand: String::new(),
        supplier: String::new(),
        unit_measure: String::new(),
        unit_price: 0.0,
    };
    let price = existing
        .map(|p| p.unit_price.to_string())
        .unwrap_or_default();
    let p = existing.unwrap_or(&blank);
    format!(
        "<input name=\"barcode\" value=\"{}\" placeholder=\"Codice a barre\">\
         <input name=\"name\" value=\"{}\" placeholder=\"Nome\">\
         <input name=\"brand\" value=\"{}\" placeholder=\"Marca\">\
         <input name=\"supplier\" value=\"{}\" placeholder=\"Fornitore\">\
         <input name=\"unit_measure\" value=\"{}\" placeholder=\"Unità\">\
         <input name=\"unit_price\" value=\"{}\" placeholder=\"Prezzo unitario\">",
        escape(&p.barcode),
        escape(&p.name),
        escape(&p.brand),
        escape(&p.supplier),
        escape(&p.unit_measure),
        escape(&price),
    )
}

async fn product_new_page(_user: AuthUser, Query(q): Query<NewProductQuery>) -> Html<String> {
    let code = q.code.unwrap_or_default();
    let body = format!(
        "<form method=\"post\" action=\"/product/new\">{}<button>Crea</button></form>",
        product_form_fields(None, &code),
    );
    page("Nuovo prodotto", None, &body)
}

async fn product_create(
    State(state): State<AppState>,
    user: AuthUser,
    Form(form): Form<ProductForm>,
) -> AppResult<Redirect> {
    let input = product_input(form);
    if input.barcode.is_empty() || input.name.is_empty() {
        return Err(AppError::InvalidInput(
            "codice a barre e nome sono obbligatori".to_string(),
        ));
    }
    match state.db.create_product(&input, user.username()) {
        Ok(id) => {
            log::info!("product {} created by {}", input.barcode, user.username());
            Ok(redirect_notice(
                &format!("/product/{id}"),
                "Prodotto creato! Ora aggiungi il primo lotto.",
            ))
        }
        Err(AppError::DuplicateBarcode) => {
            Ok(redirect_notice("/inventory", "Codice a barre già esistente!"))
        }
        Err(e) => Err(e),
    }
}

async fn product_detail(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Query(q): Query<NoticeQuery>,
) -> AppResult<Html<String>> {
    let product = state.db.get_product(id)?;
    let total = state.db.total_quantity(id)?;
    let batches = state.db.active_batches(id)?;

    let admin_actions = if user.0.role.is_admin() {
        format!(
            "<p><a href=\"/product/{id}/edit\">Modifica</a></p>\
             <form method=\"post\" action=\"/product/{id}/delete\">\
             <button>Elimina prodotto</button></form>"
        )
    } else {
        String::new()
    };
    let body = format!(
        "<p>Codice: {} — Giacenza totale: {} {}</p>\
         <h2>Lotti attivi (prima scadenza in alto)</h2>\
         <table><tr><th>Lotto</th><th>Residuo / iniziale</th><th>Arrivo</th>\
         <th>Scadenza</th><th>Caricato da</th><th></th></tr>{}</table>\
         <h2>Carico</h2>\
         <form method=\"post\" action=\"/add_batch/{id}\">\
         <input name=\"quantity\" placeholder=\"Quantità\">\
         <input name=\"expiry_date\" placeholder=\"YYYY-MM-DD\">\
         <button>Carica</button></form>\
         {admin_actions}\
         <p><a href=\"/dashboard\">Dashboard</a></p>",
        escape(&product.barcode),
        total,
        escape(&product.unit_measure),
        batch_rows(&batches),
    );
    Ok(page(&product.name, q.notice.as_deref(), &body))
}

async fn product_edit_page(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Query(q): Query<NoticeQuery>,
) -> AppResult<Html<String>> {
    user.require_admin()?;
    let p = state.db.get_product(id)?;
    let current = ProductInput {
        barcode: p.barcode,
        name: p.name.clone(),
        brand: p.brand,
        supplier: p.supplier,
        unit_measure: p.unit_measure,
        unit_price: p.unit_price,
    };
    let body = format!(
        "<form method=\"post\" action=\"/product/{id}/edit\">{}\
         <button>Salva</button></form>",
        product_form_fields(Some(&current), ""),
    );
    Ok(page(
        &format!("Modifica {}", p.name),
        q.notice.as_deref(),
        &body,
    ))
}

async fn product_edit(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Form(form): Form<ProductForm>,
) -> AppResult<Redirect> {
    user.require_admin()?;
    let input = product_input(form);
    if input.barcode.is_empty() || input.name.is_empty() {
        return Err(AppError::InvalidInput(
            "codice a barre e nome sono obbligatori".to_string(),
        ));
    }
    match state.db.update_product(id, &input) {
        Ok(()) => Ok(redirect_notice(
            &format!("/product/{id}"),
            "Prodotto aggiornato",
        )),
        Err(AppError::DuplicateBarcode) => Ok(redirect_notice(
            &format!("/product/{id}/edit"),
            "Codice a barre già esistente!",
        )),
        Err(e) => Err(e),
    }
}

async fn product_delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Redirect> {
    user.require_admin()?;
    state.db.delete_product(id)?;
    log::info!("product {id} deleted by {}", user.username());
    Ok(redirect_notice("/inventory", "Prodotto eliminato"))
}

// --- Stock movements ---

async fn add_batch(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<i64>,
    Form(form): Form<AddBatchForm>,
) -> AppResult<Redirect> {
    let quantity = parse_quantity(&form.quantity)?;
    let expiry = parse_expiry(form.expiry_date.as_deref())?;
    let product = state.db.get_product(product_id)?;
    state.db.receive(product_id, quantity, expiry, user.username())?;
    log::info!(
        "stock-in: {quantity} {} of {} by {}",
        product.unit_measure,
        product.name,
        user.username(),
    );
    Ok(redirect_notice(
        &format!("/product/{product_id}"),
        &format!("Caricati {quantity} {} di {}", product.unit_measure, product.name),
    ))
}

async fn use_batch(
    State(state): State<AppState>,
    user: AuthUser,
    Path(batch_id): Path<i64>,
    Form(form): Form<UseBatchForm>,
) -> AppResult<Redirect> {
    let quantity = parse_quantity(&form.quantity_use)?;
    let batch = state.db.get_batch(batch_id)?;
    let back = format!("/product/{}", batch.product_id);
    match state.db.consume(batch_id, quantity, user.username()) {
        Ok(()) => {
            log::info!("stock-out: {quantity} from batch {batch_id} by {}", user.username());
            Ok(redirect_notice(&back, "Scarico effettuato con successo."))
        }
        Err(err) => match err {
            AppError::InsufficientQuantity | AppError::InvalidInput(_) => {
                Ok(redirect_notice(&back, &err.to_string()))
            }
            other => Err(other),
        },
    }
}

// --- User administration ---

async fn admin_users_page(
    State(state): State<AppState>,
    user: AuthUser,
    Query(q): Query<NoticeQuery>,
) -> AppResult<Html<String>> {
    user.require_admin()?;
    let users = state.db.list_users()?;
    let body = format!(
        "<table><tr><th>Id</th><th>Username</th><th>Ruolo</th><th></th></tr>{}</table>\
         <h2>Nuovo utente</h2>\
         <form method=\"post\" action=\"/admin/users\">\
         <input type=\"hidden\" name=\"action\" value=\"create\">\
         <input name=\"username\" placeholder=\"Username\">\
         <input name=\"password\" type=\"password\" placeholder=\"Password\">\
         <select name=\"role\"><option value=\"user\">user</option>\
         <option value=\"admin\">admin</option></select>\
         <button>Crea</button></form>\
         <p><a href=\"/dashboard\">Dashboard</a></p>",
        user_rows(&users),
    );
    Ok(page("Gestione utenti", q.notice.as_deref(), &body))
}

async fn admin_users_submit(
    State(state): State<AppState>,
    user: AuthUser,
    Form(form): Form<UserAdminForm>,
) -> AppResult<Redirect> {
    user.require_admin()?;
    match form.action.as_str() {
        "create" => {
            let username = form.username.unwrap_or_default().trim().to_string();
            let password = form.password.unwrap_or_default();
            if username.is_empty() || password.is_empty() {
                return Err(AppError::InvalidInput(
                    "username e password sono obbligatori".to_string(),
                ));
            }
            let role = Role::from_db(form.role.as_deref().unwrap_or("user"));
            let hash = auth::hash_password(&password)?;
            match state.db.create_user(&username, &hash, role) {
                Ok(_) => {
                    log::info!("user {username} created by {}", user.username());
                    Ok(redirect_notice("/admin/users", "Utente creato"))
                }
                Err(AppError::DuplicateUsername) => {
                    Ok(redirect_notice("/admin/users", "Username già in uso"))
                }
                Err(e) => Err(e),
            }
        }
        "delete" => {
            let id = form
                .user_id
                .as_deref()
                .and_then(|s| s.trim().parse::<i64>().ok())
                .ok_or_else(|| AppError::InvalidInput("id utente non valido".to_string()))?;
            state.db.delete_user(id)?;
            log::info!("user {id} deleted by {}", user.username());
            Ok(redirect_notice("/admin/users", "Utente eliminato"))
        }
        other => Err(AppError::InvalidInput(format!("azione sconosciuta: {other}"))),
    }
}

// --- CSV export ---

async fn export_csv(State(state): State<AppState>, _user: AuthUser) -> AppResult<Response> {
    let rows = state.db.list_stock()?;
    let bytes = export::inventory_csv(&rows)?;
    let filename = export::export_filename(Local::now().date_naive());
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_parsing_is_lenient() {
        assert_eq!(parse_price(Some("1.5")), 1.5);
        assert_eq!(parse_price(Some(" 2 ")), 2.0);
        assert_eq!(parse_price(Some("abc")), 0.0);
        assert_eq!(parse_price(Some("-3")), 0.0);
        assert_eq!(parse_price(Some("")), 0.0);
        assert_eq!(parse_price(None), 0.0);
    }

    #[test]
    fn quantity_parsing_is_strict() {
        assert_eq!(parse_quantity("4").unwrap(), 4.0);
        assert!(matches!(
            parse_quantity("quattro").unwrap_err(),
            AppError::InvalidInput(_)
        ));
    }

    #[test]
    fn expiry_parsing_is_strict_and_optional() {
        assert_eq!(parse_expiry(None).unwrap(), None);
        assert_eq!(parse_expiry(Some("")).unwrap(), None);
        assert_eq!(
            parse_expiry(Some("2025-01-01")).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 1)
        );
        assert!(matches!(
            parse_expiry(Some("01/01/2025")).unwrap_err(),
            AppError::InvalidInput(_)
        ));
        assert!(matches!(
            parse_expiry(Some("2025-02-30")).unwrap_err(),
            AppError::InvalidInput(_)
        ));
    }

    #[test]
    fn notice_urls_are_percent_encoded() {
        assert_eq!(urlencode("Prodotto creato!"), "Prodotto%20creato%21");
        assert_eq!(urlencode("abc-123"), "abc-123");
    }

    #[test]
    fn html_escaping_covers_form_values() {
        assert_eq!(
            escape("<b>\"ciao\" & 'via'</b>"),
            "&lt;b&gt;&quot;ciao&quot; &amp; &#39;via&#39;&lt;/b&gt;"
        );
    }
}
