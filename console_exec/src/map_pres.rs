//! # Map Presentation
//!
//! Keeps the map widget in step with the session state. The presentation layer decides whether a
//! marker must be created or only moved, and when the view is recentred, but it never makes a
//! control decision.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::tc::LatLng;
use log::debug;

use crate::{loc::Position, route_session::Route};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Capabilities of the map widget the console draws on.
pub trait MapWidget {
    fn place_vehicle_marker(&mut self, at: LatLng);
    fn move_vehicle_marker(&mut self, to: LatLng);

    fn place_destination_marker(&mut self, at: LatLng);
    fn move_destination_marker(&mut self, to: LatLng);
    fn remove_destination_marker(&mut self);

    fn draw_route(&mut self, points: &[LatLng]);
    fn remove_route(&mut self);

    /// Centre the view on a point with the given zoom level.
    fn set_view(&mut self, centre: LatLng, zoom: u8);

    /// Fit the view to the box given by its south-west and north-east corners.
    fn fit_bounds(&mut self, south_west: LatLng, north_east: LatLng);
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct MapPres<M: MapWidget> {
    widget: M,

    zoom: u8,

    vehicle_marker: bool,
    destination_marker: bool,
    route_drawn: bool,

    /// Number of times the view was centred on the vehicle.
    num_recentres: u64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<M: MapWidget> MapPres<M> {
    pub fn new(widget: M, zoom: u8) -> Self {
        Self {
            widget,
            zoom,
            vehicle_marker: false,
            destination_marker: false,
            route_drawn: false,
            num_recentres: 0,
        }
    }

    /// Show a new vehicle fix, recentring the view if this is the first one.
    pub fn on_vehicle_fix(&mut self, position: &Position, first: bool) {
        if self.vehicle_marker {
            self.widget.move_vehicle_marker(position.lat_lng());
        }
        else {
            self.widget.place_vehicle_marker(position.lat_lng());
            self.vehicle_marker = true;
        }

        if first {
            self.recentre(position);
        }
    }

    /// Convert a click on the map into a position.
    pub fn click_to_position(&self, at: LatLng) -> Position {
        Position::from(at)
    }

    pub fn show_destination(&mut self, position: &Position) {
        if self.destination_marker {
            self.widget.move_destination_marker(position.lat_lng());
        }
        else {
            self.widget.place_destination_marker(position.lat_lng());
            self.destination_marker = true;
        }
    }

    /// Draw a route, replacing any previous one, and fit the view around it.
    pub fn show_route(&mut self, route: &Route, vehicle: Option<&Position>) {
        let points: Vec<LatLng> = route.points.iter().map(|p| p.lat_lng()).collect();
        if points.is_empty() {
            return;
        }

        self.clear_route();
        self.widget.draw_route(&points);
        self.route_drawn = true;

        let vehicle = vehicle.map(|v| v.lat_lng());
        let (sw, ne) = bounds(points.iter().chain(vehicle.iter()));
        self.widget.fit_bounds(sw, ne);
    }

    pub fn clear_route(&mut self) {
        if self.route_drawn {
            self.widget.remove_route();
            self.route_drawn = false;
        }
    }

    /// Remove the destination and route, and recentre on the vehicle if its position is known.
    pub fn reset(&mut self, vehicle: Option<&Position>) {
        self.clear_route();

        if self.destination_marker {
            self.widget.remove_destination_marker();
            self.destination_marker = false;
        }

        if let Some(v) = vehicle {
            self.recentre(v);
        }
    }

    pub fn widget(&self) -> &M {
        &self.widget
    }

    pub fn has_vehicle_marker(&self) -> bool {
        self.vehicle_marker
    }

    pub fn has_destination_marker(&self) -> bool {
        self.destination_marker
    }

    pub fn has_route(&self) -> bool {
        self.route_drawn
    }

    pub fn num_recentres(&self) -> u64 {
        self.num_recentres
    }

    fn recentre(&mut self, on: &Position) {
        debug!("Centring map on {:.5}, {:.5}", on.latitude, on.longitude);
        self.widget.set_view(on.lat_lng(), self.zoom);
        self.num_recentres += 1;
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// South-west and north-east corners of the box around the points.
fn bounds<'a, I>(points: I) -> (LatLng, LatLng)
where
    I: Iterator<Item = &'a LatLng>,
{
    let mut sw = LatLng { lat: f64::MAX, lng: f64::MAX };
    let mut ne = LatLng { lat: f64::MIN, lng: f64::MIN };

    for p in points {
        sw.lat = sw.lat.min(p.lat);
        sw.lng = sw.lng.min(p.lng);
        ne.lat = ne.lat.max(p.lat);
        ne.lng = ne.lng.max(p.lng);
    }

    (sw, ne)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Call {
        PlaceVehicle,
        MoveVehicle,
        PlaceDest,
        MoveDest,
        RemoveDest,
        DrawRoute(usize),
        RemoveRoute,
        SetView,
        FitBounds(LatLng, LatLng),
    }

    #[derive(Default)]
    struct Recorder(Vec<Call>);

    impl MapWidget for Recorder {
        fn place_vehicle_marker(&mut self, _: LatLng) {
            self.0.push(Call::PlaceVehicle)
        }
        fn move_vehicle_marker(&mut self, _: LatLng) {
            self.0.push(Call::MoveVehicle)
        }
        fn place_destination_marker(&mut self, _: LatLng) {
            self.0.push(Call::PlaceDest)
        }
        fn move_destination_marker(&mut self, _: LatLng) {
            self.0.push(Call::MoveDest)
        }
        fn remove_destination_marker(&mut self) {
            self.0.push(Call::RemoveDest)
        }
        fn draw_route(&mut self, points: &[LatLng]) {
            self.0.push(Call::DrawRoute(points.len()))
        }
        fn remove_route(&mut self) {
            self.0.push(Call::RemoveRoute)
        }
        fn set_view(&mut self, _: LatLng, _: u8) {
            self.0.push(Call::SetView)
        }
        fn fit_bounds(&mut self, sw: LatLng, ne: LatLng) {
            self.0.push(Call::FitBounds(sw, ne))
        }
    }

    fn route() -> Route {
        Route {
            destination_id: 1,
            points: vec![
                Position::new(12.90, 77.60),
                Position::new(12.93, 77.66),
                Position::new(12.95, 77.65),
            ],
            distance_m: 6500.0,
            duration_s: None,
        }
    }

    #[test]
    fn test_click_to_position() {
        let mp = MapPres::new(Recorder::default(), 15);
        let p = mp.click_to_position(LatLng { lat: 12.95, lng: 77.65 });
        assert_eq!(p, Position::new(12.95, 77.65));
        assert!(mp.widget().0.is_empty());
    }

    #[test]
    fn test_marker_created_once() {
        let mut mp = MapPres::new(Recorder::default(), 16);
        mp.on_vehicle_fix(&Position::new(12.90, 77.60), true);
        mp.on_vehicle_fix(&Position::new(12.91, 77.60), false);
        mp.on_vehicle_fix(&Position::new(12.92, 77.60), false);

        assert_eq!(
            mp.widget().0,
            vec![Call::PlaceVehicle, Call::SetView, Call::MoveVehicle, Call::MoveVehicle]
        );
        assert_eq!(mp.num_recentres(), 1);
    }

    #[test]
    fn test_route_replaced_and_fitted() {
        let mut mp = MapPres::new(Recorder::default(), 16);
        let vehicle = Position::new(12.89, 77.61);

        mp.show_route(&route(), Some(&vehicle));
        mp.show_route(&route(), Some(&vehicle));

        let calls = &mp.widget().0;
        assert_eq!(calls[0], Call::DrawRoute(3));
        assert_eq!(
            calls[1],
            Call::FitBounds(LatLng { lat: 12.89, lng: 77.60 }, LatLng { lat: 12.95, lng: 77.66 })
        );
        assert_eq!(calls[2], Call::RemoveRoute);
        assert_eq!(calls[3], Call::DrawRoute(3));
    }

    #[test]
    fn test_reset_recentres() {
        let mut mp = MapPres::new(Recorder::default(), 16);
        let vehicle = Position::new(12.90, 77.60);

        mp.show_destination(&Position::new(12.95, 77.65));
        mp.show_route(&route(), None);
        mp.reset(Some(&vehicle));

        assert!(!mp.has_destination_marker());
        assert!(!mp.has_route());
        assert_eq!(mp.num_recentres(), 1);

        // Nothing left to remove the second time
        let n = mp.widget().0.len();
        mp.reset(None);
        assert_eq!(mp.widget().0.len(), n);
    }
}
