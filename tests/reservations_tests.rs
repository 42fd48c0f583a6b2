mod common;

use std::time::Duration;

use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};
use transfer_admin::error::Error;
use transfer_admin::export::export_file_name;
use transfer_admin::reservations::{
    CalendarView, NewReservation, ReservationPatch, ReservationQuery, ReservationStatus,
};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::*;

fn query_of(request: &wiremock::Request) -> Vec<(String, String)> {
    request
        .url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

fn new_reservation() -> NewReservation {
    NewReservation {
        name: "Ana Mora".to_string(),
        phone: "8888-0000".to_string(),
        email: "ana@example.com".to_string(),
        service_at: "2026-10-20T08:30".to_string(),
        pickup: "Hotel Central".to_string(),
        destination: "Aeropuerto SJO".to_string(),
        passengers: 3,
    }
}

#[tokio::test]
async fn test_list_filters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reservas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            reservation_json("r-1", "Ana", "PENDIENTE")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/reservas/r-7"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(reservation_json("r-7", "Luis", "CONFIRMADA")),
        )
        .mount(&mock_server)
        .await;

    let panel = signed_in(panel(&mock_server));
    let client = panel.reservations();

    client.list(&ReservationQuery::new()).await.unwrap();
    client
        .list(&ReservationQuery::new().status(ReservationStatus::Confirmed).search("ana"))
        .await
        .unwrap();
    client
        .list(&ReservationQuery::new().status(ReservationStatus::Rejected))
        .await
        .unwrap();
    let single = client.list(&ReservationQuery::new().id("r-7")).await.unwrap();
    assert_eq!(single.len(), 1);
    assert_eq!(single[0].status, ReservationStatus::Confirmed);

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(query_of(&requests[0]), vec![("estado".to_string(), "PENDIENTE".to_string())]);
    assert_eq!(query_of(&requests[1]), vec![("buscar".to_string(), "ana".to_string())]);
    assert_eq!(query_of(&requests[2]), vec![("estado".to_string(), "RECHAZADA".to_string())]);
    assert_eq!(requests[3].url.path(), "/reservas/r-7");
}

#[tokio::test]
async fn test_calendar_reloads_after_accept() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reservas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            reservation_json("r-1", "Ana", "PENDIENTE")
        ])))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/reservas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            reservation_json("r-1", "Ana", "CONFIRMADA")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/reservas/r-1/aceptar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let panel = signed_in(panel(&mock_server));
    let calendar = panel.calendar();
    assert_eq!(calendar.load().await.unwrap(), 1);

    let events = calendar.events().await;
    assert_eq!(events[0].title, "Ana - Hotel Central → Aeropuerto SJO");
    assert_eq!(events[0].colors.background, "#FFA500");

    calendar.accept("r-1").await.unwrap();

    let events = calendar.events().await;
    assert_eq!(events[0].status, ReservationStatus::Confirmed);
    assert_eq!(events[0].colors.background, "#8BC34A");

    let day = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
    assert_eq!(calendar.events_in_view(CalendarView::Day, day, &Utc).await.len(), 1);
    let next_day = NaiveDate::from_ymd_opt(2026, 10, 21).unwrap();
    assert!(calendar.events_in_view(CalendarView::Day, next_day, &Utc).await.is_empty());
    assert_eq!(calendar.events_in_view(CalendarView::Month, next_day, &Utc).await.len(), 1);
}

#[tokio::test]
async fn test_failed_reject_shows_server_message_and_keeps_list() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reservas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            reservation_json("r-1", "Ana", "CONFIRMADA")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/reservas/r-1/rechazar"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "message": "La reserva ya fue confirmada" })),
        )
        .mount(&mock_server)
        .await;

    let panel = signed_in(panel(&mock_server));
    let calendar = panel.calendar();
    calendar.load().await.unwrap();

    let err = calendar.reject("r-1").await.unwrap_err();
    assert_eq!(err.user_message("Error al rechazar la reserva"), "La reserva ya fue confirmada");
    assert_eq!(calendar.reservations().await.len(), 1);
}

#[tokio::test]
async fn test_calendar_refresh_runs_periodically() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reservas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let panel = signed_in(panel(&mock_server));
    let handle = panel.calendar().spawn_refresh(Duration::from_millis(40));
    tokio::time::sleep(Duration::from_millis(150)).await;
    drop(handle);

    assert!(mock_server.received_requests().await.unwrap().len() >= 2);
}

#[tokio::test]
async fn test_create_validates_before_sending() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/reservas"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "r-new" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let panel = signed_in(panel(&mock_server));
    let client = panel.reservations();

    let mut invalid = new_reservation();
    invalid.pickup = " ".to_string();
    let err = client.create(&invalid).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(err.user_message(""), "El lugar de recogida es requerido");

    client.create(&new_reservation()).await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["desdeAdmin"], json!(true));
    assert_eq!(body["nombre"], json!("Ana Mora"));
    assert_eq!(body["cantidadPersonas"], json!(3));
}

#[tokio::test]
async fn test_table_edit_saves_and_reloads() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reservas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            reservation_json("r-1", "Ana", "CONFIRMADA"),
            reservation_json("r-2", "Luis", "PENDIENTE")
        ])))
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/reservas/r-2"))
        .and(body_json(json!({ "monto": 150.5, "chofer": "Carlos" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let panel = signed_in(panel(&mock_server));
    let table = panel.table();
    assert!(table.is_loading().await);
    assert_eq!(table.load().await.unwrap(), 2);
    assert!(!table.is_loading().await);

    let draft = table.begin_edit("r-2").await.unwrap();
    assert!(draft.is_empty());
    assert!(table.set_draft(ReservationPatch::default().with_amount(150.5).with_driver("Carlos")).await);

    table.save().await.unwrap();
    assert!(table.editing().await.is_none());
    assert!(table.begin_edit("missing").await.is_none());
}

#[tokio::test]
async fn test_table_export_selection() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reservas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            reservation_json("r-1", "Ana", "CONFIRMADA"),
            reservation_json("r-2", "Luis", "PENDIENTE"),
            reservation_json("r-3", "Marta", "RECHAZADA")
        ])))
        .mount(&mock_server)
        .await;

    let panel = signed_in(panel(&mock_server));
    let table = panel.table();
    table.load().await.unwrap();

    table.set_selection_mode(true).await;
    assert!(table.toggle("r-3").await);
    assert!(table.toggle("r-1").await);
    assert!(!table.toggle("r-3").await);
    assert_eq!(table.selected().await, vec!["r-1".to_string()]);

    table.toggle_all().await;
    assert_eq!(table.selected().await.len(), 3);
    table.toggle_all().await;
    assert!(table.selected().await.is_empty());

    table.toggle("r-2").await;
    let dir = tempfile::tempdir().unwrap();
    let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
    let file = table.export(dir.path(), today, &Utc).await.unwrap();
    assert_eq!(file.file_name().unwrap().to_str().unwrap(), export_file_name(today));
    assert_eq!(export_file_name(today), "Reservas_17-10-2026.xlsx");
    assert!(file.exists());

    table.set_selection_mode(false).await;
    assert!(table.selected().await.is_empty());
}
