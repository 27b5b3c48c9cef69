use chrono::{TimeZone, Utc};

use arrivals_ops::arrivals::export::render_csv;
use arrivals_ops::arrivals::flight::FlightPayload;
use arrivals_ops::arrivals::manifest::{ManifestPayload, PassengerPayload};
use arrivals_ops::ports::{port_config, QueueRatios};
use arrivals_ops::store::OpsStore;

fn flight_payload(terminal: &str, act_pax: Option<u32>) -> FlightPayload {
    FlightPayload {
        operator: "TestAir".to_string(),
        status: "On Chox".to_string(),
        gate: "46".to_string(),
        stand: "44R".to_string(),
        act_pax,
        airport_id: "STN".to_string(),
        terminal: terminal.to_string(),
        iata: "TS123".to_string(),
        origin: "AMS".to_string(),
        scheduled: "2025-07-09T00:55:00Z".to_string(),
        ..FlightPayload::default()
    }
}

fn passenger(nationality: &str, eea_flag: &str, document_type: &str, id: &str) -> PassengerPayload {
    PassengerPayload {
        document_issuing_country: nationality.to_string(),
        person_type: "P".to_string(),
        document_level: "Primary".to_string(),
        age: "30".to_string(),
        in_transit_flag: "N".to_string(),
        eea_flag: eea_flag.to_string(),
        identifier: id.to_string(),
        document_type: document_type.to_string(),
        poav_key: "1".to_string(),
        nationality: nationality.to_string(),
        ..PassengerPayload::default()
    }
}

fn manifest_payload(passengers: Vec<PassengerPayload>) -> ManifestPayload {
    ManifestPayload {
        event_code: "DC".to_string(),
        departure_port: "AMS".to_string(),
        voyage_suffix: String::new(),
        arrival_port: "STN".to_string(),
        departure_country: "NLD".to_string(),
        voyage_number: "0123".to_string(),
        voyage_key: "key".to_string(),
        scheduled_departure_date: "2025-07-08".to_string(),
        scheduled_arrival_date: "2025-07-09".to_string(),
        carrier_type: "AIR".to_string(),
        carrier_code: "TS".to_string(),
        scheduled_departure_time: "06:30:00".to_string(),
        scheduled_arrival_time: "00:55:00".to_string(),
        file_id: "fileID".to_string(),
        passengers,
    }
}

fn query_instant() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, 9, 0, 55, 0).unwrap()
}

#[test]
fn duplicate_identifier_submission_is_idempotent() {
    let store = OpsStore::new(port_config("STN"));
    store
        .submit_flight(flight_payload("T1", Some(0)))
        .expect("flight accepted");

    let once = store
        .submit_manifest(manifest_payload(vec![passenger(
            "GBR", "EEA", "Passport", "id1",
        )]))
        .expect("manifest accepted");
    let twice = store
        .submit_manifest(manifest_payload(vec![
            passenger("GBR", "EEA", "Passport", "id1"),
            passenger("GBR", "EEA", "Passport", "id1"),
        ]))
        .expect("manifest accepted");

    assert_eq!(once.passengers, twice.passengers);
}

#[test]
fn conflicting_duplicate_attributes_defer_to_the_first_record() {
    let store = OpsStore::new(port_config("STN"));
    store
        .submit_flight(flight_payload("T1", Some(0)))
        .expect("flight accepted");

    // Same identifier, contradictory nationality on the second entry.
    store
        .submit_manifest(manifest_payload(vec![
            passenger("GBR", "EEA", "Passport", "id1"),
            passenger("ZWE", "", "P", "id1"),
        ]))
        .expect("manifest accepted");

    let rows = store.arrivals_rows(query_instant(), "T1", 0, 24);
    let api = rows[0].splits.api.expect("api tier");
    assert_eq!(api.egates, 1, "first-seen EEA record is authoritative");
    assert_eq!(api.non_eea_desk, 0);
}

#[test]
fn transit_passengers_count_toward_totals_but_not_pcp() {
    let store = OpsStore::new(port_config("STN"));
    store
        .submit_flight(flight_payload("T1", None))
        .expect("flight accepted");

    let mut in_transit = passenger("GBR", "EEA", "Passport", "");
    in_transit.in_transit_flag = "Y".to_string();
    store
        .submit_manifest(manifest_payload(vec![
            in_transit,
            passenger("GBR", "EEA", "Passport", ""),
        ]))
        .expect("manifest accepted");

    let rows = store.arrivals_rows(query_instant(), "T1", 0, 24);
    assert_eq!(rows[0].total_pax, Some(2));
    assert_eq!(rows[0].pcp_pax, Some(1));
}

#[test]
fn historical_ratios_populate_the_historical_tier() {
    let store = OpsStore::new(port_config("STN"));
    store
        .submit_flight(flight_payload("T1", Some(100)))
        .expect("flight accepted");
    store.record_historical_split(
        "T1",
        "TS0123",
        QueueRatios {
            egates: 0.5,
            eea_desk: 0.4,
            non_eea_desk: 0.1,
            fast_track: 0.0,
        },
    );

    let rows = store.arrivals_rows(query_instant(), "T1", 0, 24);
    let historical = rows[0].splits.historical.expect("historical tier");
    assert_eq!(historical.egates, 50);
    assert_eq!(historical.eea_desk, 40);
    assert_eq!(historical.non_eea_desk, 10);

    let csv = render_csv(&rows, store.terminal_config("T1"), false).expect("renders");
    let fields: Vec<&str> = csv.lines().nth(1).expect("data row").split(',').collect();
    assert_eq!(fields[18], "50", "Historical e-Gates");
    assert_eq!(fields[19], "40", "Historical EEA");
    assert_eq!(fields[20], "10", "Historical Non-EEA");
}

#[test]
fn flights_without_historical_data_render_an_empty_tier() {
    let store = OpsStore::new(port_config("STN"));
    store
        .submit_flight(flight_payload("T1", Some(100)))
        .expect("flight accepted");

    let rows = store.arrivals_rows(query_instant(), "T1", 0, 24);
    assert!(rows[0].splits.historical.is_none());

    let csv = render_csv(&rows, store.terminal_config("T1"), false).expect("renders");
    let fields: Vec<&str> = csv.lines().nth(1).expect("data row").split(',').collect();
    assert_eq!(fields[18], "", "no data is not zero");
    assert_eq!(fields[19], "");
    assert_eq!(fields[20], "");
}

#[test]
fn fast_track_terminals_report_b5jssk_desk_traffic_in_their_own_queue() {
    let store = OpsStore::new(port_config("LHR"));
    let mut payload = flight_payload("T5", Some(0));
    payload.airport_id = "LHR".to_string();
    store.submit_flight(payload).expect("flight accepted");

    let mut passengers = Vec::new();
    for _ in 0..10 {
        passengers.push(passenger("AUS", "", "P", ""));
    }
    let mut manifest = manifest_payload(passengers);
    manifest.arrival_port = "LHR".to_string();
    store.submit_manifest(manifest).expect("manifest accepted");

    let rows = store.arrivals_rows(query_instant(), "T5", 0, 24);
    let api = rows[0].splits.api.expect("api tier");
    assert_eq!(api.egates, 6);
    assert_eq!(api.fast_track, 4);
    assert_eq!(api.eea_desk, 0);

    let csv = render_csv(&rows, store.terminal_config("T5"), false).expect("renders");
    let fields: Vec<&str> = csv.lines().nth(1).expect("data row").split(',').collect();
    assert_eq!(fields[17], "4", "API Fast Track rendered at fast-track terminals");
}

#[test]
fn hour_window_filters_exports() {
    let store = OpsStore::new(port_config("STN"));
    store
        .submit_flight(flight_payload("T1", Some(51)))
        .expect("flight accepted");

    // Scheduled 00:55Z renders as 01:55 London; an 02:00-onwards window
    // must exclude it.
    assert_eq!(store.arrivals_rows(query_instant(), "T1", 0, 24).len(), 1);
    assert_eq!(store.arrivals_rows(query_instant(), "T1", 2, 24).len(), 0);
    assert_eq!(store.arrivals_rows(query_instant(), "T1", 1, 2).len(), 1);
}

#[test]
fn exports_only_cover_the_requested_terminal() {
    let store = OpsStore::new(port_config("MAN"));
    store
        .submit_flight(flight_payload("T1", Some(51)))
        .expect("flight accepted");
    store
        .submit_flight(FlightPayload {
            iata: "BA200".to_string(),
            ..flight_payload("T2", Some(30))
        })
        .expect("flight accepted");

    let t1_rows = store.arrivals_rows(query_instant(), "T1", 0, 24);
    assert_eq!(t1_rows.len(), 1);
    assert_eq!(t1_rows[0].code_iata, "TS0123");

    let t2_rows = store.arrivals_rows(query_instant(), "T2", 0, 24);
    assert_eq!(t2_rows.len(), 1);
    assert_eq!(t2_rows[0].code_iata, "BA0200");
}
