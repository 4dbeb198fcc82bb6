use crate::{
    common::{State, Torque},
    controllers::{ControlLaw, FrictionCompensation, SwitchCondition},
};
use anyhow::{ensure, Context, Result};
use log::{debug, info};

/// The law currently driving the motors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveLaw {
    First,
    Second,
}

impl ActiveLaw {
    /// 1 or 2, as used in logs and exported time series.
    pub const fn number(self) -> u8 {
        match self {
            ActiveLaw::First => 1,
            ActiveLaw::Second => 2,
        }
    }
    const fn index(self) -> usize {
        match self {
            ActiveLaw::First => 0,
            ActiveLaw::Second => 1,
        }
    }
    const fn other(self) -> Self {
        match self {
            ActiveLaw::First => ActiveLaw::Second,
            ActiveLaw::Second => ActiveLaw::First,
        }
    }
}

/// How the [`CombinedController`] may move between its two laws.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwitchMode {
    /// Start on the first law, move to the second once `condition2` fires and
    /// stay there. `condition1` is never consulted.
    Latch,
    /// `condition_i` hands control to law `i` whenever it fires while the
    /// other law is active.
    Bidirectional,
}

/// One control tick as seen by the [`CombinedController`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HistoryEntry {
    pub t: f64,
    pub x: State,
    /// Torque handed to the caller, after friction compensation.
    pub u: Torque,
    /// Output of the active law before friction compensation.
    pub u_raw: Torque,
    /// Output of the inactive law, only computed with `compute_both`.
    pub u_inactive: Option<Torque>,
    pub active: ActiveLaw,
}

/// Runs one of two control laws, typically a swing-up tracker followed by a
/// stabilizer near the goal.
pub struct CombinedController {
    laws: [Box<dyn ControlLaw>; 2],
    conditions: [Box<dyn SwitchCondition>; 2],
    compute_both: bool,
    mode: SwitchMode,
    friction: Option<FrictionCompensation>,
    active: ActiveLaw,
    initialized: bool,
    history: Vec<HistoryEntry>,
}

impl CombinedController {
    /// `condition1` hands control to `law1`, `condition2` to `law2`. The
    /// controller starts on `law1` in [`SwitchMode::Latch`].
    pub fn new(
        law1: impl ControlLaw + 'static,
        law2: impl ControlLaw + 'static,
        condition1: impl SwitchCondition + 'static,
        condition2: impl SwitchCondition + 'static,
    ) -> Self {
        Self {
            laws: [Box::new(law1), Box::new(law2)],
            conditions: [Box::new(condition1), Box::new(condition2)],
            compute_both: false,
            mode: SwitchMode::Latch,
            friction: None,
            active: ActiveLaw::First,
            initialized: false,
            history: Vec::new(),
        }
    }

    /// Also evaluate the inactive law on every tick. Its output only ends up
    /// in the history.
    #[must_use]
    pub fn compute_both(mut self, compute_both: bool) -> Self {
        self.compute_both = compute_both;
        self
    }

    #[must_use]
    pub fn switch_mode(mut self, mode: SwitchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn set_friction_compensation(&mut self, friction: FrictionCompensation) {
        self.friction = Some(friction);
    }

    pub fn active(&self) -> ActiveLaw {
        self.active
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Decide which law drives this tick.
    fn update_active(&mut self, t: f64, x: &State) {
        let candidate = self.active.other();
        let consult = match self.mode {
            SwitchMode::Latch => self.active == ActiveLaw::First,
            SwitchMode::Bidirectional => true,
        };
        if consult && self.conditions[candidate.index()].check(t, x) {
            info!(
                "switching to control law {} at t = {:.4}, x = {:?}",
                candidate.number(),
                t,
                x
            );
            self.active = candidate;
        }
    }
}

impl ControlLaw for CombinedController {
    fn init(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        for (i, law) in self.laws.iter_mut().enumerate() {
            law.init()
                .with_context(|| format!("While initializing control law {}", i + 1))?;
        }
        debug!(
            "combined controller ready ({:?}, compute_both = {})",
            self.mode, self.compute_both
        );
        self.initialized = true;
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        for law in &mut self.laws {
            law.reset()?;
        }
        self.active = ActiveLaw::First;
        self.history.clear();
        Ok(())
    }

    /// The switch is decided before the active law runs. If that law then
    /// fails, the switch stands but no history entry is recorded for the tick.
    fn get_control_output(&mut self, t: f64, x: &State) -> Result<Torque> {
        ensure!(
            self.initialized,
            "combined controller asked for a control output before init()"
        );
        self.update_active(t, x);

        let active = self.active;
        let u_raw = self.laws[active.index()].get_control_output(t, x)?;
        let u_inactive = if self.compute_both {
            Some(self.laws[active.other().index()].get_control_output(t, x)?)
        } else {
            None
        };
        let u = match &self.friction {
            Some(friction) => friction.apply(u_raw, x),
            None => u_raw,
        };

        self.history.push(HistoryEntry {
            t,
            x: *x,
            u,
            u_raw,
            u_inactive,
            active,
        });
        Ok(u)
    }
}
