use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CompartmentSnapshot {
    pub day: u32,
    pub susceptible: u64,
    pub exposed: u64,
    pub incubating: u64,
    pub infected: u64,
    pub recovered: u64,
    /// Cumulative.
    pub deaths: u64,
    /// Virus load in the environment, not a count of cats.
    pub environmental_virus: f64,
}

impl CompartmentSnapshot {
    /// All-zero snapshot for a day a run never reached.
    pub fn extinct(day: u32) -> Self {
        Self {
            day,
            ..Default::default()
        }
    }

    /// Cats still alive on this day.
    pub fn living(&self) -> u64 {
        self.susceptible + self.exposed + self.incubating + self.infected + self.recovered
    }
}

/// Daily snapshots of one run, starting at day 0. Runs that die out stop early
/// rather than being padded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SimulationRun {
    snapshots: Vec<CompartmentSnapshot>,
}

impl SimulationRun {
    pub fn with_capacity(days: usize) -> Self {
        Self {
            snapshots: Vec::with_capacity(days),
        }
    }

    pub fn push(&mut self, snapshot: CompartmentSnapshot) {
        self.snapshots.push(snapshot);
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn get(&self, day: usize) -> Option<&CompartmentSnapshot> {
        self.snapshots.get(day)
    }

    pub fn snapshots(&self) -> &[CompartmentSnapshot] {
        &self.snapshots
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CompartmentSnapshot> {
        self.snapshots.iter()
    }

    pub fn final_snapshot(&self) -> Option<&CompartmentSnapshot> {
        self.snapshots.last()
    }

    /// Day of the last snapshot if every cat had died by then.
    pub fn extinction_day(&self) -> Option<u32> {
        self.final_snapshot()
            .filter(|snapshot| snapshot.living() == 0)
            .map(|snapshot| snapshot.day)
    }
}

impl<'a> IntoIterator for &'a SimulationRun {
    type Item = &'a CompartmentSnapshot;
    type IntoIter = std::slice::Iter<'a, CompartmentSnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
