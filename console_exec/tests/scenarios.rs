//! Scenario tests for the console, driven cycle by cycle against a scripted vehicle and routing
//! service. Requests are executed through the same decoding path as the link workers.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    cell::RefCell,
    collections::VecDeque,
    time::{Duration, Instant},
};

use comms_if::{
    net::{HttpTransport, NetParams, TransportError},
    tc::{LatLng, VehicleMode},
};
use console_lib::{
    console::Console,
    data_store::FixStatus,
    drive::DriveButton,
    input::{InputEvent, JoystickWidget},
    link_client::execute,
    loc::{is_fix, Position},
    map_pres::MapWidget,
    params::ConsoleExecParams,
    route_session::NavigationError,
};

// ------------------------------------------------------------------------------------------------
// MOCKS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum MapCall {
    PlaceVehicle(LatLng),
    MoveVehicle(LatLng),
    PlaceDest(LatLng),
    MoveDest(LatLng),
    RemoveDest,
    DrawRoute(usize),
    RemoveRoute,
    SetView(LatLng),
    FitBounds,
}

#[derive(Default)]
struct MockMap {
    calls: Vec<MapCall>,
}

impl MapWidget for MockMap {
    fn place_vehicle_marker(&mut self, at: LatLng) {
        self.calls.push(MapCall::PlaceVehicle(at))
    }
    fn move_vehicle_marker(&mut self, to: LatLng) {
        self.calls.push(MapCall::MoveVehicle(to))
    }
    fn place_destination_marker(&mut self, at: LatLng) {
        self.calls.push(MapCall::PlaceDest(at))
    }
    fn move_destination_marker(&mut self, to: LatLng) {
        self.calls.push(MapCall::MoveDest(to))
    }
    fn remove_destination_marker(&mut self) {
        self.calls.push(MapCall::RemoveDest)
    }
    fn draw_route(&mut self, points: &[LatLng]) {
        self.calls.push(MapCall::DrawRoute(points.len()))
    }
    fn remove_route(&mut self) {
        self.calls.push(MapCall::RemoveRoute)
    }
    fn set_view(&mut self, centre: LatLng, _zoom: u8) {
        self.calls.push(MapCall::SetView(centre))
    }
    fn fit_bounds(&mut self, _: LatLng, _: LatLng) {
        self.calls.push(MapCall::FitBounds)
    }
}

impl MockMap {
    fn count<F: Fn(&MapCall) -> bool>(&self, f: F) -> usize {
        self.calls.iter().filter(|c| f(c)).count()
    }
}

#[derive(Default)]
struct MockJoystick {
    live: bool,
    creates: u32,
}

impl JoystickWidget for MockJoystick {
    fn create(&mut self) {
        assert!(!self.live, "Joystick created twice");
        self.live = true;
        self.creates += 1;
    }
    fn destroy(&mut self) {
        self.live = false;
    }
}

/// Scripted vehicle and routing service.
struct MockService {
    /// Location replies still to give, the last one is repeated once empty
    locations: RefCell<VecDeque<(f64, f64)>>,
    last_location: RefCell<(f64, f64)>,

    mode_reply: RefCell<String>,
    navigate_reply: RefCell<String>,
    route_reply: RefCell<Option<String>>,
    route_status: RefCell<u16>,

    offline: RefCell<bool>,

    /// Every request as `(method, url, body)`
    calls: RefCell<Vec<(String, String, Option<serde_json::Value>)>>,
}

impl Default for MockService {
    fn default() -> Self {
        Self {
            locations: RefCell::new(VecDeque::new()),
            last_location: RefCell::new((0.0, 0.0)),
            mode_reply: RefCell::new(SUCCESS.into()),
            navigate_reply: RefCell::new(SUCCESS.into()),
            route_reply: RefCell::new(None),
            route_status: RefCell::new(200),
            offline: RefCell::new(false),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl HttpTransport for MockService {
    fn get(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        self.calls.borrow_mut().push(("GET".into(), url.into(), None));
        if *self.offline.borrow() {
            return Err(TransportError::RequestFailed(url.into(), "connection refused".into()));
        }

        if url.ends_with("/location") {
            if let Some(l) = self.locations.borrow_mut().pop_front() {
                *self.last_location.borrow_mut() = l;
            }
            let (lat, lng) = *self.last_location.borrow();
            Ok(serde_json::json!({ "lat": lat, "lng": lng }).to_string().into_bytes())
        }
        else if url.ends_with("/state") {
            Ok(br#"{ "motion_state": "STOPPED", "mode": "AUTONOMOUS" }"#.to_vec())
        }
        else if url.contains("/route/") {
            let status = *self.route_status.borrow();
            match &*self.route_reply.borrow() {
                Some(r) if status == 200 => Ok(r.clone().into_bytes()),
                Some(r) => Err(TransportError::HttpStatus(url.into(), status, r.clone().into_bytes())),
                None => Err(TransportError::HttpStatus(url.into(), 503, Vec::new())),
            }
        }
        else {
            Err(TransportError::HttpStatus(url.into(), 404, Vec::new()))
        }
    }

    fn post(
        &self,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<Vec<u8>, TransportError> {
        self.calls
            .borrow_mut()
            .push(("POST".into(), url.into(), body.cloned()));
        if *self.offline.borrow() {
            return Err(TransportError::RequestFailed(url.into(), "connection refused".into()));
        }

        if url.ends_with("/mode") {
            Ok(self.mode_reply.borrow().clone().into_bytes())
        }
        else if url.ends_with("/navigate") {
            Ok(self.navigate_reply.borrow().clone().into_bytes())
        }
        else {
            Ok(b"{}".to_vec())
        }
    }
}

impl MockService {
    fn num_sent(&self, path: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|(_, url, _)| url.ends_with(path))
            .count()
    }

    fn last_body(&self, path: &str) -> Option<serde_json::Value> {
        self.calls
            .borrow()
            .iter()
            .rev()
            .find(|(_, url, _)| url.ends_with(path))
            .and_then(|(_, _, body)| body.clone())
    }
}

// ------------------------------------------------------------------------------------------------
// HARNESS
// ------------------------------------------------------------------------------------------------

const SUCCESS: &str = r#"{ "status": "success" }"#;

const ROUTE_OK: &str = r#"{
    "code": "Ok",
    "routes": [{
        "geometry": {
            "type": "LineString",
            "coordinates": [[77.60, 12.90], [77.62, 12.93], [77.65, 12.95]]
        },
        "distance": 6500.0,
        "duration": 780.0
    }]
}"#;

struct Harness {
    console: Console<MockMap, MockJoystick>,
    service: MockService,
    params: ConsoleExecParams,
    now: Instant,
}

impl Harness {
    fn new() -> Self {
        let params = ConsoleExecParams {
            net: NetParams {
                vehicle_endpoint: "http://rover.test/api".into(),
                routing_endpoint: "http://osrm.test/route/v1/driving".into(),
                timeout_ms: 100,
            },
            ..ConsoleExecParams::default()
        };

        Self {
            console: Console::new(&params, MockMap::default(), MockJoystick::default()),
            service: MockService::default(),
            params,
            now: Instant::now(),
        }
    }

    /// Execute every queued request and deliver its reply.
    fn pump(&mut self) {
        for (id, request) in self.console.take_requests() {
            let result = execute(&self.service, &self.params.net, &request);
            self.console.handle_reply(id, result);
        }
    }

    /// Advance the clock, run one cycle, and deliver the replies.
    fn step(&mut self, dt: Duration) {
        self.now += dt;
        self.console.cycle(self.now);
        self.pump();
    }

    fn poll_round(&mut self) {
        self.step(self.params.poll_period());
    }

    fn input(&mut self, event: InputEvent) {
        self.console.handle_input(event);
    }

    fn acquire_fix(&mut self, lat: f64, lng: f64) {
        self.service.locations.borrow_mut().push_back((lat, lng));
        self.poll_round();
        assert_eq!(self.console.data_store().fix_status, FixStatus::Locked);
    }

    fn enter_manual(&mut self) {
        self.input(InputEvent::SelectMode(VehicleMode::Manual));
        self.step(Duration::from_millis(1));
        assert_eq!(self.console.data_store().mode, VehicleMode::Manual);
    }

    fn route_to(&mut self, lat: f64, lng: f64) {
        *self.service.route_reply.borrow_mut() = Some(ROUTE_OK.into());
        self.input(InputEvent::MapClick(LatLng { lat, lng }));
        self.input(InputEvent::ComputeRoute);
        self.step(Duration::from_millis(1));
    }

    fn map(&self) -> &MockMap {
        self.console.map().widget()
    }
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

// ------------------------------------------------------------------------------------------------
// SCENARIOS
// ------------------------------------------------------------------------------------------------

#[test]
fn fix_test_is_exactly_the_origin() {
    assert!(!is_fix(&Position::new(0.0, 0.0)));
    assert!(is_fix(&Position::new(0.0, 77.6)));
    assert!(is_fix(&Position::new(12.9, 0.0)));
    assert!(is_fix(&Position::new(-0.000_001, 0.0)));
}

#[test]
fn searching_then_locked_recentres_once() {
    let mut h = Harness::new();
    h.service
        .locations
        .borrow_mut()
        .extend(vec![(0.0, 0.0), (0.0, 0.0), (0.0, 0.0), (12.9, 77.6), (12.91, 77.6)]);

    for _ in 0..3 {
        h.poll_round();
        assert_eq!(h.console.data_store().fix_status, FixStatus::Searching);
        assert_eq!(h.map().count(|c| matches!(c, MapCall::PlaceVehicle(_))), 0);
    }

    h.poll_round();
    assert_eq!(h.console.data_store().fix_status, FixStatus::Locked);
    assert_eq!(
        h.map().calls,
        vec![
            MapCall::PlaceVehicle(LatLng { lat: 12.9, lng: 77.6 }),
            MapCall::SetView(LatLng { lat: 12.9, lng: 77.6 }),
        ]
    );
    assert_eq!(h.console.data_store().status.text, "GPS Fix Acquired. Pin a destination.");

    h.poll_round();
    assert_eq!(h.map().count(|c| matches!(c, MapCall::PlaceVehicle(_))), 1);
    assert_eq!(h.map().count(|c| matches!(c, MapCall::MoveVehicle(_))), 1);
    assert_eq!(h.map().count(|c| matches!(c, MapCall::SetView(_))), 1);
}

#[test]
fn sentinel_after_fix_keeps_marker() {
    let mut h = Harness::new();
    h.acquire_fix(12.9, 77.6);
    h.service.locations.borrow_mut().push_back((0.0, 0.0));
    h.poll_round();

    let ds = h.console.data_store();
    assert_eq!(ds.fix_status, FixStatus::Searching);
    assert_eq!(ds.vehicle_pos, Some(Position::new(12.9, 77.6)));
    assert!(h.console.map().has_vehicle_marker());
}

#[test]
fn polling_survives_connection_loss() {
    let mut h = Harness::new();
    h.acquire_fix(12.9, 77.6);

    *h.service.offline.borrow_mut() = true;
    h.poll_round();
    h.poll_round();
    assert_eq!(h.console.data_store().fix_status, FixStatus::ConnectionError);
    assert_eq!(h.console.data_store().status.text, "Connection lost to GPS server");
    assert_eq!(h.service.num_sent("/location"), 3);

    *h.service.offline.borrow_mut() = false;
    h.poll_round();
    assert_eq!(h.console.data_store().fix_status, FixStatus::Locked);
}

#[test]
fn slow_vehicle_does_not_back_up_polls() {
    let mut h = Harness::new();

    // Five poll periods pass without the vehicle answering anything
    let mut unanswered = Vec::new();
    for _ in 0..5 {
        h.now += h.params.poll_period();
        h.console.cycle(h.now);
        unanswered.extend(h.console.take_requests());
    }
    assert_eq!(unanswered.len(), 2);
    assert_eq!(h.console.num_in_flight(), 2);

    // Late answers free the poller again
    for (id, request) in unanswered {
        let result = execute(&h.service, &h.params.net, &request);
        h.console.handle_reply(id, result);
    }
    h.poll_round();
    assert_eq!(h.service.num_sent("/location"), 2);
    assert_eq!(h.service.num_sent("/state"), 2);
    assert_eq!(h.console.num_in_flight(), 0);
}

#[test]
fn polling_continues_in_every_mode() {
    let mut h = Harness::new();
    h.poll_round();
    h.enter_manual();
    h.poll_round();
    assert_eq!(h.service.num_sent("/location"), 2);
    assert_eq!(h.service.num_sent("/state"), 2);
}

#[test]
fn throttle_forwards_only_latest_in_window() {
    let mut h = Harness::new();
    h.enter_manual();

    h.input(InputEvent::JoystickMove { x: 0.0, y: 0.1 });
    h.step(ms(10));
    assert_eq!(h.service.num_sent("/control"), 1);

    for y in [0.2, 0.3, 0.4, 0.5].iter() {
        h.input(InputEvent::JoystickMove { x: 0.0, y: *y });
    }
    h.step(ms(10));
    assert_eq!(h.service.num_sent("/control"), 1);

    h.step(ms(100));
    assert_eq!(h.service.num_sent("/control"), 2);
    let body = h.service.last_body("/control").unwrap();
    assert_eq!(body["speed"].as_f64(), Some(50.0));
    assert_eq!(body["angle"].as_f64(), Some(0.0));

    // Nothing new offered, nothing sent
    h.step(ms(200));
    assert_eq!(h.service.num_sent("/control"), 2);
}

#[test]
fn release_stop_delivered_within_one_window() {
    let mut h = Harness::new();
    h.enter_manual();

    h.input(InputEvent::ButtonPress(DriveButton::Forward));
    h.step(ms(10));
    assert_eq!(h.service.last_body("/control").unwrap()["speed"].as_f64(), Some(50.0));

    h.input(InputEvent::ButtonRelease(DriveButton::Forward));
    h.step(ms(10));
    assert_eq!(h.service.num_sent("/control"), 1);

    h.step(ms(100));
    let body = h.service.last_body("/control").unwrap();
    assert_eq!(body["speed"].as_f64(), Some(0.0));
    assert_eq!(body["angle"].as_f64(), Some(0.0));
}

#[test]
fn release_stop_survives_leaving_manual() {
    let mut h = Harness::new();
    h.enter_manual();

    h.input(InputEvent::ButtonPress(DriveButton::Forward));
    h.step(ms(10));
    assert_eq!(h.service.last_body("/control").unwrap()["speed"].as_f64(), Some(50.0));

    // The release stop is still waiting for its window when the mode change commits
    h.input(InputEvent::ButtonRelease(DriveButton::Forward));
    h.input(InputEvent::SelectMode(VehicleMode::Autonomous));
    h.step(ms(10));
    assert_eq!(h.console.data_store().mode, VehicleMode::Autonomous);

    h.step(ms(200));
    h.step(ms(200));
    assert_eq!(h.service.num_sent("/control"), 2);
    let body = h.service.last_body("/control").unwrap();
    assert_eq!(body["speed"].as_f64(), Some(0.0));
    assert_eq!(body["angle"].as_f64(), Some(0.0));
}

#[test]
fn drive_input_ignored_outside_manual() {
    let mut h = Harness::new();
    h.acquire_fix(12.9, 77.6);

    h.input(InputEvent::JoystickMove { x: 0.5, y: 1.0 });
    h.input(InputEvent::ButtonPress(DriveButton::Forward));
    h.input(InputEvent::JoystickEnd);
    for _ in 0..10 {
        h.step(ms(50));
    }

    assert_eq!(h.service.num_sent("/control"), 0);
    assert!(!h.console.mode_ctrl().joystick().live);
}

#[test]
fn map_click_ignored_in_manual() {
    let mut h = Harness::new();
    h.acquire_fix(12.9, 77.6);
    h.enter_manual();

    h.input(InputEvent::MapClick(LatLng { lat: 12.95, lng: 77.65 }));
    h.input(InputEvent::ComputeRoute);
    h.step(ms(10));

    assert!(h.console.data_store().destination.is_none());
    assert_eq!(h.map().count(|c| matches!(c, MapCall::PlaceDest(_))), 0);
    assert_eq!(h.service.num_sent("geometries=geojson"), 0);
}

#[test]
fn pin_before_fix_asks_to_wait() {
    let mut h = Harness::new();
    h.poll_round();

    h.input(InputEvent::MapClick(LatLng { lat: 12.95, lng: 77.65 }));
    assert!(h.console.data_store().destination.is_none());
    assert_eq!(h.console.data_store().status.text, "Please wait for your location");
}

#[test]
fn compute_route_shows_distance() {
    let mut h = Harness::new();
    h.acquire_fix(12.90, 77.60);
    h.route_to(12.95, 77.65);

    let route_calls: Vec<String> = h
        .service
        .calls
        .borrow()
        .iter()
        .filter(|(_, url, _)| url.contains("/route/"))
        .map(|(_, url, _)| url.clone())
        .collect();
    assert_eq!(
        route_calls,
        vec!["http://osrm.test/route/v1/driving/77.6,12.9;77.65,12.95?overview=full&geometries=geojson"]
    );

    let ds = h.console.data_store();
    let info = ds.trip_info().unwrap();
    assert_eq!(info.route_distance_label().unwrap(), "6.50 km");
    assert_eq!(info.duration_label().unwrap(), "13 min");
    assert_eq!(ds.status.text, "Route calculated! Ready to Travel.");
    assert_eq!(h.map().count(|c| *c == MapCall::DrawRoute(3)), 1);
    assert_eq!(h.map().count(|c| *c == MapCall::FitBounds), 1);
}

#[test]
fn routing_failure_leaves_no_route() {
    let mut h = Harness::new();
    h.acquire_fix(12.90, 77.60);

    *h.service.route_reply.borrow_mut() =
        Some(r#"{ "code": "NoRoute", "routes": [], "message": "Impossible route" }"#.into());
    h.input(InputEvent::MapClick(LatLng { lat: 12.95, lng: 77.65 }));
    h.input(InputEvent::ComputeRoute);
    h.step(ms(1));

    let ds = h.console.data_store();
    assert!(ds.route.is_none());
    assert!(ds.status.is_error);
    assert!(ds.status.text.contains("Impossible route"));
    assert!(!h.console.map().has_route());
}

#[test]
fn router_rejection_is_no_route() {
    let mut h = Harness::new();
    h.acquire_fix(12.90, 77.60);

    // The router answers a failed route with 400 and a routing body
    *h.service.route_status.borrow_mut() = 400;
    *h.service.route_reply.borrow_mut() =
        Some(r#"{ "code": "NoRoute", "message": "Impossible route between points" }"#.into());
    h.input(InputEvent::MapClick(LatLng { lat: 12.95, lng: 77.65 }));
    h.input(InputEvent::ComputeRoute);
    h.step(ms(1));

    let ds = h.console.data_store();
    assert!(ds.route.is_none());
    assert!(ds.status.is_error);
    assert_eq!(ds.status.text, "No route found: Impossible route between points");
}

#[test]
fn router_outage_is_service_unavailable() {
    let mut h = Harness::new();
    h.acquire_fix(12.90, 77.60);

    h.input(InputEvent::MapClick(LatLng { lat: 12.95, lng: 77.65 }));
    h.input(InputEvent::ComputeRoute);
    h.step(ms(1));

    let ds = h.console.data_store();
    assert!(ds.route.is_none());
    assert!(ds.status.is_error);
    assert!(ds.status.text.starts_with("Routing service unavailable"));
}

#[test]
fn new_pin_invalidates_route() {
    let mut h = Harness::new();
    h.acquire_fix(12.90, 77.60);
    h.route_to(12.95, 77.65);
    assert!(h.console.data_store().valid_route().is_some());

    h.input(InputEvent::MapClick(LatLng { lat: 12.97, lng: 77.70 }));
    assert!(h.console.data_store().valid_route().is_none());
    assert!(!h.console.map().has_route());

    assert!(matches!(h.console.start_travel(), Err(NavigationError::NoRoute)));
    h.step(ms(1));
    assert_eq!(h.service.num_sent("/navigate"), 0);
}

#[test]
fn start_travel_without_route_sends_nothing() {
    let mut h = Harness::new();
    h.acquire_fix(12.90, 77.60);
    h.input(InputEvent::MapClick(LatLng { lat: 12.95, lng: 77.65 }));

    assert!(matches!(h.console.start_travel(), Err(NavigationError::NoRoute)));
    h.step(ms(1));
    assert_eq!(h.service.num_sent("/navigate"), 0);
    assert!(!h.console.data_store().travel_active);
}

#[test]
fn travel_start_and_stop() {
    let mut h = Harness::new();
    h.acquire_fix(12.90, 77.60);
    h.route_to(12.95, 77.65);

    h.input(InputEvent::StartTravel);
    h.step(ms(1));
    assert!(h.console.data_store().travel_active);
    let body = h.service.last_body("/navigate").unwrap();
    assert_eq!(body["waypoints"].as_array().map(|w| w.len()), Some(3));

    // Stop clears travel even if the vehicle can't be reached
    *h.service.offline.borrow_mut() = true;
    h.input(InputEvent::StopTravel);
    h.step(ms(1));
    assert!(!h.console.data_store().travel_active);
    assert_eq!(h.service.num_sent("/stop"), 1);
    assert_eq!(h.console.data_store().status.text, "Travel Stopped by User");
}

#[test]
fn travel_accepted_after_repin_names_previous_destination() {
    let mut h = Harness::new();
    h.acquire_fix(12.90, 77.60);
    h.route_to(12.95, 77.65);

    h.input(InputEvent::StartTravel);
    let in_flight = h.console.take_requests();

    h.input(InputEvent::MapClick(LatLng { lat: 12.97, lng: 77.70 }));
    for (id, request) in in_flight {
        let result = execute(&h.service, &h.params.net, &request);
        h.console.handle_reply(id, result);
    }

    let ds = h.console.data_store();
    assert!(ds.travel_active);
    assert!(ds.valid_route().is_none());
    assert_eq!(ds.status.text, "Travelling to previous destination");
}

#[test]
fn reset_twice_same_as_once() {
    let mut h = Harness::new();
    h.acquire_fix(12.90, 77.60);
    h.route_to(12.95, 77.65);
    h.input(InputEvent::StartTravel);
    h.step(ms(1));

    h.input(InputEvent::Reset);
    h.step(ms(1));
    let once = h.console.data_store().clone();
    assert_eq!(h.service.num_sent("/stop"), 1);

    h.input(InputEvent::Reset);
    h.step(ms(1));
    let twice = h.console.data_store().clone();

    assert_eq!(once.destination, twice.destination);
    assert_eq!(once.route, twice.route);
    assert_eq!(once.travel_active, twice.travel_active);
    assert_eq!(once.status, twice.status);
    assert_eq!(h.service.num_sent("/stop"), 1);

    assert!(twice.destination.is_none());
    assert!(twice.route.is_none());
    assert!(!twice.travel_active);
    assert_eq!(twice.status.text, "Map reset. Pin a destination.");
    assert!(!h.console.map().has_destination_marker());
    assert_eq!(
        h.map().calls.last(),
        Some(&MapCall::SetView(LatLng { lat: 12.90, lng: 77.60 }))
    );
}

#[test]
fn replies_after_reset_are_discarded() {
    let mut h = Harness::new();
    h.acquire_fix(12.90, 77.60);
    *h.service.route_reply.borrow_mut() = Some(ROUTE_OK.into());

    h.input(InputEvent::MapClick(LatLng { lat: 12.95, lng: 77.65 }));
    h.input(InputEvent::ComputeRoute);
    let in_flight = h.console.take_requests();

    h.input(InputEvent::Reset);
    for (id, request) in in_flight {
        let result = execute(&h.service, &h.params.net, &request);
        h.console.handle_reply(id, result);
    }

    assert!(h.console.data_store().route.is_none());
    assert!(!h.console.map().has_route());
}

#[test]
fn rejected_mode_switch_keeps_mode() {
    let mut h = Harness::new();
    *h.service.mode_reply.borrow_mut() = r#"{ "status": "error", "message": "busy" }"#.into();

    h.input(InputEvent::SelectMode(VehicleMode::Manual));
    h.step(ms(1));

    let ds = h.console.data_store();
    assert_eq!(ds.mode, VehicleMode::Autonomous);
    assert_eq!(ds.status.text, "busy");
    assert!(ds.status.is_error);
    assert!(!h.console.mode_ctrl().joystick().live);
}

#[test]
fn leaving_manual_tears_down_joystick() {
    let mut h = Harness::new();
    h.enter_manual();
    assert!(h.console.mode_ctrl().joystick().live);

    h.input(InputEvent::SelectMode(VehicleMode::SemiAutonomous));
    h.step(ms(1));
    assert_eq!(h.console.data_store().mode, VehicleMode::SemiAutonomous);
    assert!(!h.console.mode_ctrl().joystick().live);

    h.input(InputEvent::JoystickMove { x: 0.0, y: 1.0 });
    h.step(ms(200));
    assert_eq!(h.service.num_sent("/control"), 0);

    // Entering again creates a fresh instance
    h.enter_manual();
    assert_eq!(h.console.mode_ctrl().joystick().creates, 2);
}

#[test]
fn limits_clamped_and_committed() {
    let mut h = Harness::new();
    h.input(InputEvent::SetLimits { max_speed: 150.0, max_turn: 33.3 });
    h.step(ms(1));

    let body = h.service.last_body("/config").unwrap();
    assert_eq!(body["max_speed"].as_u64(), Some(100));
    assert_eq!(body["max_turn"].as_u64(), Some(33));
    assert_eq!(h.console.data_store().limits.max_speed, 100.0);
}
