//! Hierarchy selection state and the picker state machine.
//!
//! The picker owns the current selection at each of the four levels, the
//! option lists the dropdowns render, and the in-flight fetches that
//! repopulate those lists as the user moves down the hierarchy. Fetches run
//! on spawned tasks and report back over an MPSC channel; every task is
//! tagged with the generation current when it was spawned, and results
//! whose tag no longer matches are dropped, so a fetch that resolves after
//! the user has already moved on can never clobber newer state.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::{sorted_or_empty, GeographyDirectory, ParentLevel};
use crate::models::{AdministrativeUnit, CanonicalLocation, ONLINE};

use super::resolver::{resolve, ResolvedLocation};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the fetch outcome channel.
/// A transition spawns at most one task sending two results, so this is
/// generous headroom.
const CHANNEL_BUFFER_SIZE: usize = 32;

// ============================================================================
// Selection state
// ============================================================================

/// The currently selected unit at each hierarchy level.
///
/// `province` stays absent for the lifetime of a region selection when the
/// region has no province level; cities then attach directly to the region.
/// `is_remote` is mutually exclusive with all four positional fields.
/// The barangay is kept by name: it has no parent-independent code that
/// anything downstream consumes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HierarchySelection {
    pub region: Option<AdministrativeUnit>,
    pub province: Option<AdministrativeUnit>,
    pub city: Option<AdministrativeUnit>,
    pub barangay: Option<String>,
    pub is_remote: bool,
}

impl HierarchySelection {
    /// How far down the hierarchy the selection currently reaches.
    pub fn completion(&self) -> CompletionLevel {
        if self.barangay.is_some() {
            CompletionLevel::Barangay
        } else if self.city.is_some() {
            CompletionLevel::City
        } else if self.province.is_some() {
            CompletionLevel::Province
        } else if self.region.is_some() {
            CompletionLevel::Region
        } else {
            CompletionLevel::Empty
        }
    }

    /// The canonical string for this selection. Always a string, possibly
    /// empty - incomplete selections are acceptable intermediate states and
    /// callers never see an absent value.
    pub fn encode(&self) -> String {
        CanonicalLocation::from_parts(
            self.barangay.as_deref(),
            self.city.as_ref().map(|u| u.name.as_str()),
            self.province.as_ref().map(|u| u.name.as_str()),
            self.is_remote,
        )
        .map(|location| location.to_string())
        .unwrap_or_default()
    }
}

/// Depth of a selection, from nothing picked to a full chain. Remote mode
/// is orthogonal and tracked on the selection itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CompletionLevel {
    Empty,
    Region,
    Province,
    City,
    Barangay,
}

// ============================================================================
// Fetch results
// ============================================================================

/// Results sent back from spawned fetch tasks.
///
/// Each variant carries the generation tag captured at spawn time. The
/// pump applies a result only while its tag still matches the current
/// generation; anything else is a leftover from an abandoned selection and
/// is silently dropped.
enum FetchOutcome {
    /// Region listing for the top-level dropdown
    Regions { tag: u64, units: Vec<AdministrativeUnit> },
    /// Province listing under the selected region
    Provinces { tag: u64, units: Vec<AdministrativeUnit> },
    /// City listing under the selected province (or region, when the
    /// region has no province level)
    Cities { tag: u64, units: Vec<AdministrativeUnit> },
    /// Barangay listing under the selected city
    Barangays { tag: u64, units: Vec<AdministrativeUnit> },
    /// A finished reverse resolution of the mounted value
    Resolved { tag: u64, resolved: Box<ResolvedLocation> },
}

// ============================================================================
// Props and callbacks
// ============================================================================

/// Inputs supplied by the embedding form.
#[derive(Debug, Clone, Default)]
pub struct PickerProps {
    /// Current canonical location string; empty means not yet set.
    pub value: String,
    /// Whether the "Online" pseudo-location is offered at the region level.
    pub allow_online: bool,
    /// Presentation hint for mandatory-field marking. The picker itself
    /// never blocks on it.
    pub required: bool,
}

/// Invoked with the canonical string after every transition.
pub type ChangeListener = Box<dyn Fn(&str) + Send>;

/// Invoked with the region name whenever the region-level selection
/// changes, independent of lower levels.
pub type RegionListener = Box<dyn Fn(&str) + Send>;

// ============================================================================
// Picker
// ============================================================================

/// The location picker state machine.
///
/// Owns one [`HierarchySelection`] for the lifetime of a mount. The
/// embedding event loop calls [`process_fetch_results`] after await points
/// (or [`settle`] to block until in-flight fetches land) and re-renders the
/// option lists from the accessors.
///
/// [`process_fetch_results`]: LocationPicker::process_fetch_results
/// [`settle`]: LocationPicker::settle
pub struct LocationPicker {
    directory: Arc<dyn GeographyDirectory>,
    props: PickerProps,
    selection: HierarchySelection,

    // Option lists, name-sorted, one per dropdown
    regions: Vec<AdministrativeUnit>,
    provinces: Vec<AdministrativeUnit>,
    cities: Vec<AdministrativeUnit>,
    barangays: Vec<AdministrativeUnit>,

    // Staleness tag; bumped by any transition that invalidates pending fetches
    generation: u64,

    outcome_tx: mpsc::Sender<FetchOutcome>,
    outcome_rx: mpsc::Receiver<FetchOutcome>,
    in_flight: Vec<JoinHandle<()>>,

    on_change: Option<ChangeListener>,
    on_region_change: Option<RegionListener>,
}

impl LocationPicker {
    /// Create an unmounted picker. Attach listeners, then call [`mount`] to
    /// start resolving the supplied value.
    ///
    /// [`mount`]: LocationPicker::mount
    pub fn new(directory: Arc<dyn GeographyDirectory>, props: PickerProps) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        Self {
            directory,
            props,
            selection: HierarchySelection::default(),
            regions: Vec::new(),
            provinces: Vec::new(),
            cities: Vec::new(),
            barangays: Vec::new(),
            generation: 0,
            outcome_tx,
            outcome_rx,
            in_flight: Vec::new(),
            on_change: None,
            on_region_change: None,
        }
    }

    pub fn set_on_change(&mut self, listener: impl Fn(&str) + Send + 'static) {
        self.on_change = Some(Box::new(listener));
    }

    pub fn set_on_region_change(&mut self, listener: impl Fn(&str) + Send + 'static) {
        self.on_region_change = Some(Box::new(listener));
    }

    /// Start resolving the mounted value.
    ///
    /// A stored `"Online"` goes straight to remote mode with no directory
    /// round trips, even when the option is no longer offered - stored data
    /// wins over presentation props. An empty value only loads the region
    /// dropdown; anything else is decoded and reverse-resolved on a spawned
    /// task.
    pub fn mount(&mut self) {
        match CanonicalLocation::parse(&self.props.value) {
            Some(CanonicalLocation::Remote) => {
                self.selection.is_remote = true;
                self.fire_region_change(ONLINE);
            }
            Some(location) => self.spawn_resolve(location),
            None => self.spawn_regions(),
        }
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Region selected. Clears every lower level. The synthetic "Online"
    /// entry flips to remote mode and emits immediately; a real region
    /// kicks off its provinces fetch (and, for province-less regions, the
    /// direct cities fetch).
    pub fn select_region(&mut self, region: AdministrativeUnit) {
        self.generation += 1;
        self.selection.province = None;
        self.selection.city = None;
        self.selection.barangay = None;
        self.provinces.clear();
        self.cities.clear();
        self.barangays.clear();

        if region.name == ONLINE {
            self.selection.region = None;
            self.selection.is_remote = true;
            self.fire_region_change(ONLINE);
            self.emit_change();
            return;
        }

        self.selection.is_remote = false;
        let region_code = region.code.clone();
        let region_name = region.name.clone();
        self.selection.region = Some(region);
        self.spawn_provinces(region_code);
        self.fire_region_change(&region_name);
        self.emit_change();
    }

    /// Province selected. Clears city and barangay, fetches cities.
    pub fn select_province(&mut self, province: AdministrativeUnit) {
        self.generation += 1;
        self.selection.city = None;
        self.selection.barangay = None;
        self.selection.is_remote = false;
        self.cities.clear();
        self.barangays.clear();

        let province_code = province.code.clone();
        self.selection.province = Some(province);
        self.spawn_cities(province_code, ParentLevel::Province);
        self.emit_change();
    }

    /// City selected. Clears barangay, fetches barangays, and emits right
    /// away - the city-level string is valid without waiting for the
    /// barangay list.
    pub fn select_city(&mut self, city: AdministrativeUnit) {
        self.generation += 1;
        self.selection.barangay = None;
        self.selection.is_remote = false;
        self.barangays.clear();

        let city_code = city.code.clone();
        self.selection.city = Some(city);
        self.spawn_barangays(city_code);
        self.emit_change();
    }

    /// Barangay selected. No fetch below this level.
    pub fn select_barangay(&mut self, name: impl Into<String>) {
        self.selection.is_remote = false;
        self.selection.barangay = Some(name.into());
        self.emit_change();
    }

    /// Clear everything, remote mode included.
    pub fn clear_region(&mut self) {
        self.generation += 1;
        self.selection = HierarchySelection::default();
        self.provinces.clear();
        self.cities.clear();
        self.barangays.clear();
        self.fire_region_change("");
        self.emit_change();
    }

    /// Clear the province and everything below it.
    pub fn clear_province(&mut self) {
        self.generation += 1;
        self.selection.province = None;
        self.selection.city = None;
        self.selection.barangay = None;
        self.cities.clear();
        self.barangays.clear();
        self.emit_change();
    }

    /// Clear the city and the barangay below it.
    pub fn clear_city(&mut self) {
        self.generation += 1;
        self.selection.city = None;
        self.selection.barangay = None;
        self.barangays.clear();
        self.emit_change();
    }

    /// Clear only the barangay. Pending fetches stay valid.
    pub fn clear_barangay(&mut self) {
        self.selection.barangay = None;
        self.emit_change();
    }

    // ------------------------------------------------------------------
    // Fetch plumbing
    // ------------------------------------------------------------------

    /// Check for completed fetch tasks and apply the results that are
    /// still current.
    pub fn process_fetch_results(&mut self) {
        // Collect all pending results first to avoid borrow conflicts
        let mut outcomes = Vec::new();
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            outcomes.push(outcome);
        }
        for outcome in outcomes {
            self.apply_outcome(outcome);
        }
        self.in_flight.retain(|handle| !handle.is_finished());
    }

    /// Await every in-flight fetch, then apply the results. Gives the
    /// embedding code a deterministic point where the mount resolution or
    /// a cascade has landed.
    pub async fn settle(&mut self) {
        for handle in self.in_flight.drain(..) {
            if let Err(e) = handle.await {
                warn!(error = %e, "Fetch task failed");
            }
        }
        self.process_fetch_results();
    }

    fn apply_outcome(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Regions { tag, units } => {
                if self.is_stale(tag, "regions") {
                    return;
                }
                self.regions = units;
            }
            FetchOutcome::Provinces { tag, units } => {
                if self.is_stale(tag, "provinces") {
                    return;
                }
                self.provinces = units;
            }
            FetchOutcome::Cities { tag, units } => {
                if self.is_stale(tag, "cities") {
                    return;
                }
                self.cities = units;
            }
            FetchOutcome::Barangays { tag, units } => {
                if self.is_stale(tag, "barangays") {
                    return;
                }
                self.barangays = units;
            }
            FetchOutcome::Resolved { tag, resolved } => {
                if self.is_stale(tag, "resolution") {
                    return;
                }
                let resolved = *resolved;
                self.regions = resolved.regions;
                self.provinces = resolved.provinces;
                self.cities = resolved.cities;
                self.barangays = resolved.barangays;
                let region_name = resolved.selection.region.as_ref().map(|r| r.name.clone());
                self.selection = resolved.selection;
                // The region is new information to the caller - the stored
                // string never contains it. The value itself is not re-emitted
                // on mount: the caller already holds it.
                if let Some(name) = region_name {
                    self.fire_region_change(&name);
                }
            }
        }
    }

    fn is_stale(&self, tag: u64, what: &str) -> bool {
        if tag == self.generation {
            return false;
        }
        debug!(
            what = what,
            tag = tag,
            current = self.generation,
            "Dropping stale fetch result"
        );
        true
    }

    fn spawn_regions(&mut self) {
        let tag = self.generation;
        let directory = Arc::clone(&self.directory);
        let tx = self.outcome_tx.clone();
        self.in_flight.push(tokio::spawn(async move {
            let units = sorted_or_empty("regions", directory.list_regions().await);
            send_outcome(&tx, FetchOutcome::Regions { tag, units }).await;
        }));
    }

    fn spawn_provinces(&mut self, region_code: String) {
        let tag = self.generation;
        let directory = Arc::clone(&self.directory);
        let tx = self.outcome_tx.clone();
        self.in_flight.push(tokio::spawn(async move {
            let provinces =
                sorted_or_empty("provinces", directory.list_provinces(&region_code).await);
            let province_less = provinces.is_empty();
            send_outcome(&tx, FetchOutcome::Provinces { tag, units: provinces }).await;
            if province_less {
                // No province level: cities attach directly to the region
                let cities = sorted_or_empty(
                    "cities",
                    directory.list_cities(&region_code, ParentLevel::Region).await,
                );
                send_outcome(&tx, FetchOutcome::Cities { tag, units: cities }).await;
            }
        }));
    }

    fn spawn_cities(&mut self, parent_code: String, parent: ParentLevel) {
        let tag = self.generation;
        let directory = Arc::clone(&self.directory);
        let tx = self.outcome_tx.clone();
        self.in_flight.push(tokio::spawn(async move {
            let units = sorted_or_empty(
                "cities",
                directory.list_cities(&parent_code, parent).await,
            );
            send_outcome(&tx, FetchOutcome::Cities { tag, units }).await;
        }));
    }

    fn spawn_barangays(&mut self, city_code: String) {
        let tag = self.generation;
        let directory = Arc::clone(&self.directory);
        let tx = self.outcome_tx.clone();
        self.in_flight.push(tokio::spawn(async move {
            let units = sorted_or_empty("barangays", directory.list_barangays(&city_code).await);
            send_outcome(&tx, FetchOutcome::Barangays { tag, units }).await;
        }));
    }

    fn spawn_resolve(&mut self, location: CanonicalLocation) {
        let tag = self.generation;
        let directory = Arc::clone(&self.directory);
        let tx = self.outcome_tx.clone();
        let fragments = location.fragments();
        self.in_flight.push(tokio::spawn(async move {
            let resolved = resolve(directory.as_ref(), &fragments).await;
            send_outcome(
                &tx,
                FetchOutcome::Resolved {
                    tag,
                    resolved: Box::new(resolved),
                },
            )
            .await;
        }));
    }

    // ------------------------------------------------------------------
    // Emission
    // ------------------------------------------------------------------

    fn emit_change(&self) {
        if let Some(ref listener) = self.on_change {
            listener(&self.value());
        }
    }

    fn fire_region_change(&self, region_name: &str) {
        if let Some(ref listener) = self.on_region_change {
            listener(region_name);
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// The canonical string for the current selection.
    pub fn value(&self) -> String {
        self.selection.encode()
    }

    pub fn selection(&self) -> &HierarchySelection {
        &self.selection
    }

    pub fn completion(&self) -> CompletionLevel {
        self.selection.completion()
    }

    pub fn is_remote_mode(&self) -> bool {
        self.selection.is_remote
    }

    pub fn is_required(&self) -> bool {
        self.props.required
    }

    /// Options for the region dropdown, with the synthetic "Online" entry
    /// on top when offered.
    pub fn region_options(&self) -> Vec<AdministrativeUnit> {
        let mut options = Vec::with_capacity(self.regions.len() + 1);
        if self.props.allow_online {
            options.push(AdministrativeUnit::new(ONLINE, ONLINE));
        }
        options.extend(self.regions.iter().cloned());
        options
    }

    pub fn province_options(&self) -> &[AdministrativeUnit] {
        &self.provinces
    }

    pub fn city_options(&self) -> &[AdministrativeUnit] {
        &self.cities
    }

    pub fn barangay_options(&self) -> &[AdministrativeUnit] {
        &self.barangays
    }
}

async fn send_outcome(tx: &mpsc::Sender<FetchOutcome>, outcome: FetchOutcome) {
    if tx.send(outcome).await.is_err() {
        debug!("Picker dropped before fetch completed");
    }
}
