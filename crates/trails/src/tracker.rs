//! Interactive preview trackers.
//!
//! Trackers hold transient preview state while a user drags a point or
//! sketches a wire. They report changes to a [`TrackerObserver`], which is
//! where a front end hooks in its drawing code.

use tracing::debug;
use trails_geom::{Point3, Vec3};

/// Receives tracker changes.
///
/// All methods default to doing nothing.
pub trait TrackerObserver {
    /// A drag tracker's translation changed.
    fn placement_changed(&mut self, _translation: &Vec3) {}

    /// A wire tracker's points changed.
    fn points_changed(&mut self, _points: &[Point3]) {}

    /// The tracker was finalized and will report nothing further.
    fn finalized(&mut self) {}
}

impl TrackerObserver for () {}

/// Common tracker interface.
pub trait Tracker {
    /// Move the tracker to follow `position`.
    fn update(&mut self, position: Point3);

    /// End tracking. Later updates are ignored.
    fn finalize(&mut self);

    /// Whether [`finalize`](Tracker::finalize) has been called.
    fn is_finalized(&self) -> bool;
}

/// Tracks a drag relative to a fixed datum point.
#[derive(Debug)]
pub struct DragTracker<O: TrackerObserver = ()> {
    datum: Point3,
    translation: Vec3,
    observer: O,
    finalized: bool,
}

impl<O: TrackerObserver> DragTracker<O> {
    /// Start a drag at `datum`.
    pub fn new(datum: Point3, observer: O) -> Self {
        Self {
            datum,
            translation: Vec3::zeros(),
            observer,
            finalized: false,
        }
    }

    /// The datum the drag started at.
    pub fn datum(&self) -> Point3 {
        self.datum
    }

    /// Set the translation to `position` taken as a vector from the origin.
    pub fn update(&mut self, position: Point3) {
        self.set_translation(position.coords);
    }

    /// Set the translation to the offset of `position` from the datum.
    pub fn update_placement(&mut self, position: Point3) {
        self.set_translation(position - self.datum);
    }

    /// Current translation.
    pub fn placement(&self) -> Vec3 {
        self.translation
    }

    /// The observer.
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// End the drag and hand back the observer.
    pub fn into_observer(self) -> O {
        self.observer
    }

    fn set_translation(&mut self, translation: Vec3) {
        if self.finalized {
            debug!("ignoring update on finalized drag tracker");
            return;
        }
        self.translation = translation;
        self.observer.placement_changed(&self.translation);
    }
}

impl<O: TrackerObserver> Tracker for DragTracker<O> {
    fn update(&mut self, position: Point3) {
        DragTracker::update(self, position);
    }

    fn finalize(&mut self) {
        if !self.finalized {
            self.finalized = true;
            self.observer.finalized();
        }
    }

    fn is_finalized(&self) -> bool {
        self.finalized
    }
}

/// Tracks a polyline being sketched.
#[derive(Debug)]
pub struct WireTracker<O: TrackerObserver = ()> {
    points: Vec<Point3>,
    observer: O,
    finalized: bool,
}

impl<O: TrackerObserver> WireTracker<O> {
    /// Start tracking `points`.
    pub fn new(points: Vec<Point3>, observer: O) -> Self {
        Self {
            points,
            observer,
            finalized: false,
        }
    }

    /// Replace all points.
    pub fn update_points(&mut self, points: Vec<Point3>) {
        if self.finalized {
            debug!("ignoring update on finalized wire tracker");
            return;
        }
        self.points = points;
        self.observer.points_changed(&self.points);
    }

    /// Current points.
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// The observer.
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// End tracking and hand back the observer.
    pub fn into_observer(self) -> O {
        self.observer
    }
}

impl<O: TrackerObserver> Tracker for WireTracker<O> {
    /// Move the free end of the wire to `position`.
    fn update(&mut self, position: Point3) {
        let mut points = self.points.clone();
        if points.len() > 1 {
            points.pop();
        }
        points.push(position);
        self.update_points(points);
    }

    fn finalize(&mut self) {
        if !self.finalized {
            self.finalized = true;
            self.observer.finalized();
        }
    }

    fn is_finalized(&self) -> bool {
        self.finalized
    }
}
