//! End-to-end tests of the web interface against a temporary database.

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use http_body_util::BodyExt;
use tower::ServiceExt;

use locatif::web::{app, AppState};
use locatif::Storage;

struct TestApp {
    router: Router,
    db_path: std::path::PathBuf,
    _dir: tempfile::TempDir,
}

impl TestApp {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("locatif.db");
        Storage::open(&db_path).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        let state = AppState::new(&db_path).unwrap().at_date(today);
        Self {
            router: app(state),
            db_path,
            _dir: dir,
        }
    }

    async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn post_form(&self, uri: &str, form: &str) -> Response<Body> {
        self.send(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    fn storage(&self) -> Storage {
        Storage::connect(&self.db_path).unwrap()
    }

    /// Property "12 Rue A", tenant Dupont, rent 650 for 2024-03.
    async fn seed(&self) {
        let response = self
            .post_form(
                "/properties/new",
                "name=12+Rue+A&kind=apartment&address=12+Rue+A&monthly_charges=0",
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let response = self
            .post_form(
                "/tenants/new",
                "property_id=1&last_name=Dupont&first_name=Jean&lease_start=2024-01-01\
                 &monthly_rent=650&payment_day=5&active=on",
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let response = self
            .post_form(
                "/payments/new",
                "tenant_id=1&category=rent&amount=650&paid_on=2024-03-03&period=2024-03",
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }
}

fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

async fn body_string(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[tokio::test]
async fn test_create_redirects_with_notice() {
    let app = TestApp::new();
    let response = app
        .post_form(
            "/properties/new",
            "name=12+Rue+A&kind=apartment&address=12+Rue+A",
        )
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/properties/1?notice=property_created");

    let page = body_string(app.get("/properties/1?notice=property_created").await).await;
    assert!(page.contains("12 Rue A"));
    assert!(page.contains("Le bien a été créé."));
}

#[tokio::test]
async fn test_end_to_end_receipt() {
    let app = TestApp::new();
    app.seed().await;

    let response = app.get("/receipts/1/2024-03").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/pdf"
    );
    assert!(response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("quittance-1-2024-03.pdf"));
    let etag = response.headers()[header::ETAG].to_str().unwrap().to_string();

    let pdf = body_bytes(response).await;
    assert!(pdf.starts_with(b"%PDF-"));
    assert!(contains(&pdf, b"Loyer: 650"));
    assert!(contains(&pdf, b"Total: 650,00"));

    let again = body_bytes(app.get("/receipts/1/2024-03").await).await;
    assert_eq!(pdf, again);
    assert_eq!(etag, format!("\"{}\"", blake3::hash(&pdf).to_hex()));
}

#[tokio::test]
async fn test_receipt_not_modified_with_matching_etag() {
    let app = TestApp::new();
    app.seed().await;

    let first = app.get("/receipts/1/2024-03").await;
    let etag = first.headers()[header::ETAG].clone();

    let response = app
        .send(
            Request::get("/receipts/1/2024-03")
                .header(header::IF_NONE_MATCH, etag)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
}

#[tokio::test]
async fn test_receipt_without_payments_is_404() {
    let app = TestApp::new();
    app.seed().await;

    let response = app.get("/receipts/1/2024-04").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.get("/receipts/99/2024-03").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_receipt_invalid_month_redirects_to_picker() {
    let app = TestApp::new();
    app.seed().await;

    let response = app.get("/receipts/1/2024-13").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/receipts?notice=invalid_month");

    let response = app.get("/receipts/generate?tenant_id=1&month=mars").await;
    assert_eq!(location(&response), "/receipts?notice=invalid_month");

    let page = body_string(app.get("/receipts?notice=invalid_month").await).await;
    assert!(page.contains("Mois invalide, format attendu AAAA-MM."));
}

#[tokio::test]
async fn test_generate_redirects_to_pdf() {
    let app = TestApp::new();
    let response = app.get("/receipts/generate?tenant_id=1&month=2024-03").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/receipts/1/2024-03");

    let response = app.get("/receipts/generate?month=2024-03").await;
    assert_eq!(location(&response), "/receipts?notice=invalid_tenant");
}

#[tokio::test]
async fn test_invalid_payment_rerenders_form() {
    let app = TestApp::new();
    app.seed().await;

    let response = app
        .post_form(
            "/payments/new",
            "tenant_id=1&category=rent&amount=-5&paid_on=2024-03-03&period=2024-03",
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let page = body_string(response).await;
    assert!(page.contains("Le montant doit être un nombre positif."));
    assert!(page.contains("value=\"-5\""));

    assert_eq!(app.storage().stats().unwrap().payments, 1);
}

#[tokio::test]
async fn test_commercial_tenant_requires_siret() {
    let app = TestApp::new();
    app.post_form(
        "/properties/new",
        "name=Local&kind=commercial_unit&address=1+place+du+Marche",
    )
    .await;

    let response = app
        .post_form(
            "/tenants/new",
            "property_id=1&company_name=Boulangerie&siret=123&lease_start=2024-01-01\
             &monthly_rent=1200",
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(app.storage().stats().unwrap().tenants, 0);
}

#[tokio::test]
async fn test_dashboard_and_statistics() {
    let app = TestApp::new();
    app.seed().await;

    let response = app.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_string(response).await;
    assert!(page.contains("Tableau de bord"));
    assert!(page.contains("Jean Dupont"));
    assert!(page.contains("100 %"));
    assert!(page.contains("Aucun retard ce mois-ci."));

    let page = body_string(app.get("/statistics").await).await;
    assert!(page.contains("Mar 2024"));
    assert!(page.contains("Avr 2023"));
    assert!(page.contains("650,00 €"));
}

#[tokio::test]
async fn test_overdue_tenant_on_dashboard() {
    let app = TestApp::new();
    app.post_form(
        "/properties/new",
        "name=12+Rue+A&kind=apartment&address=12+Rue+A",
    )
    .await;
    app.post_form(
        "/tenants/new",
        "property_id=1&last_name=Martin&first_name=Paul&lease_start=2024-01-01\
         &monthly_rent=500&payment_day=10&active=on",
    )
    .await;

    let page = body_string(app.get("/").await).await;
    assert!(page.contains("class=\"overdue\""));
    assert!(page.contains("Paul Martin"));
}

#[tokio::test]
async fn test_delete_property_cascades() {
    let app = TestApp::new();
    app.seed().await;

    let response = app.post_form("/properties/1/delete", "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/properties?notice=property_deleted");

    assert_eq!(app.get("/tenants/1").await.status(), StatusCode::NOT_FOUND);
    let stats = app.storage().stats().unwrap();
    assert_eq!((stats.properties, stats.tenants, stats.payments), (0, 0, 0));
}

#[tokio::test]
async fn test_edit_and_delete_payment() {
    let app = TestApp::new();
    app.seed().await;

    let response = app.get("/payments/1/edit").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .post_form(
            "/payments/1/edit",
            "tenant_id=1&category=water&amount=30&paid_on=2024-03-04&period=2024-03",
        )
        .await;
    assert_eq!(location(&response), "/payments?notice=payment_updated");
    let payment = app.storage().get_payment(1).unwrap().unwrap();
    assert_eq!(payment.amount.cents(), 3000);

    let response = app.post_form("/payments/1/delete", "").await;
    assert_eq!(location(&response), "/payments?notice=payment_deleted");
    assert_eq!(
        app.post_form("/payments/1/delete", "").await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_settings_appear_on_receipt() {
    let app = TestApp::new();
    app.seed().await;

    let response = app
        .post_form("/settings", "name=SCI+Martin&address=8+quai+Saint-Antoine")
        .await;
    assert_eq!(location(&response), "/settings?notice=settings_saved");

    let pdf = body_bytes(app.get("/receipts/1/2024-03").await).await;
    assert!(contains(&pdf, b"SCI Martin"));

    let response = app.post_form("/settings", "name=&address=").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_unknown_pages_are_404() {
    let app = TestApp::new();
    assert_eq!(app.get("/nope").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.get("/properties/42").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        app.get("/tenants/42/edit").await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_stylesheet_served() {
    let app = TestApp::new();
    let response = app.get("/static/style.css").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/css"));
}

#[tokio::test]
async fn test_dashboard_renders_on_empty_database() {
    let app = TestApp::new();
    let response = app.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_string(response).await;
    assert!(page.contains("Mars 2024"));
    assert!(page.contains("Aucun paiement enregistré."));
}

#[tokio::test]
async fn test_edit_missing_record_with_invalid_form_is_404() {
    let app = TestApp::new();
    app.seed().await;

    let cases = [
        ("/properties/999/edit", "name=&address="),
        ("/tenants/999/edit", "property_id=1&monthly_rent=abc"),
        ("/payments/999/edit", "tenant_id=1&amount=-5"),
    ];
    for (uri, form) in cases {
        let response = app.post_form(uri, form).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }

    let response = app.post_form("/payments/1/edit", "tenant_id=1&amount=-5").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_non_numeric_id_gets_html_404() {
    let app = TestApp::new();
    for uri in ["/tenants/abc", "/properties/1x/edit", "/receipts/abc/2024-03"] {
        let response = app.get(uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        let page = body_string(response).await;
        assert!(page.contains("Page introuvable"), "{uri}");
    }
}

#[tokio::test]
async fn test_oversized_amount_rejected() {
    let app = TestApp::new();
    app.seed().await;

    let response = app
        .post_form(
            "/payments/new",
            "tenant_id=1&category=rent&amount=92233720368547758&paid_on=2024-03-03\
             &period=2024-03",
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_string(response).await.contains("Montant trop élevé."));
    assert_eq!(app.get("/statistics").await.status(), StatusCode::OK);
}
