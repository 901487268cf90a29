use crate::config::LightTiming;

/// The phase of a junction's traffic light.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum LightState {
    /// Pedestrians, and traffic not arriving on an incoming road, may cross.
    PedestrianGreen,
    /// Nobody may cross.
    PedestrianRed,
    /// Only the road currently selected by the rotation may cross.
    DriverGreen,
    /// Nobody may cross.
    DriverRed,
}

/// A junction's traffic light.
///
/// Cycles `PedestrianGreen -> PedestrianRed -> DriverGreen -> DriverRed`,
/// giving the driver-green phase to each incoming road in turn.
#[derive(Clone, Debug)]
pub struct TrafficLight {
    /// The current phase.
    state: LightState,
    /// The number of ticks left before the phase changes.
    ticks_left: u32,
    /// The length of a pedestrian-green plus pedestrian-red phase, and of a
    /// driver-green plus driver-red phase, in ticks.
    cycle_ticks: u32,
    /// Index of the incoming road that gets the next driver-green phase.
    green_road: usize,
    timing: LightTiming,
}

impl TrafficLight {
    /// Creates a light which starts in the pedestrian-green phase.
    pub(crate) fn new(cycle_ticks: u32, timing: LightTiming) -> Self {
        let mut light = Self {
            state: LightState::PedestrianGreen,
            ticks_left: 0,
            cycle_ticks,
            green_road: 0,
            timing,
        };
        light.ticks_left = light.duration(LightState::PedestrianGreen);
        light
    }

    /// The current phase.
    pub fn state(&self) -> LightState {
        self.state
    }

    /// The number of ticks before the phase changes.
    pub fn ticks_left(&self) -> u32 {
        self.ticks_left
    }

    /// The cycle length this light was created with.
    pub fn cycle_ticks(&self) -> u32 {
        self.cycle_ticks
    }

    /// Index into the junction's incoming roads of the road which has,
    /// or will next have, the driver-green phase.
    pub fn green_road(&self) -> usize {
        self.green_road
    }

    /// Advances the light by one tick.
    ///
    /// # Parameters
    /// * `incoming` - The number of incoming roads the rotation cycles through
    pub(crate) fn step(&mut self, incoming: usize) {
        self.ticks_left = self.ticks_left.saturating_sub(1);
        if self.ticks_left > 0 {
            return;
        }

        use LightState::*;
        self.state = match self.state {
            PedestrianGreen => PedestrianRed,
            PedestrianRed => DriverGreen,
            DriverGreen => {
                self.green_road += 1;
                DriverRed
            }
            DriverRed => PedestrianGreen,
        };
        if self.green_road >= incoming {
            self.green_road = 0;
        }
        self.ticks_left = self.duration(self.state);
    }

    /// Gets the duration of a phase in ticks.
    fn duration(&self, state: LightState) -> u32 {
        let ticks = match state {
            LightState::PedestrianGreen => {
                self.cycle_ticks.saturating_sub(self.timing.pedestrian_red_ticks)
            }
            LightState::PedestrianRed => self.timing.pedestrian_red_ticks,
            LightState::DriverGreen => self.cycle_ticks.saturating_sub(self.timing.driver_red_ticks),
            LightState::DriverRed => self.timing.driver_red_ticks,
        };
        ticks.max(1)
    }
}
