//! Simulation engine that steps the site energy balance through virtual time.

use rand::{SeedableRng, rngs::StdRng};
use tracing::{debug, info, warn};

use crate::devices::types::{day_index, hour_of_day, minute_of_day};
use crate::devices::{Battery, DemandModel, Inverter, SolarArray, WeatherState};

use super::clock::Clock;
use super::dispatch::{DispatchStrategy, dispatch};
use super::economics::EconomicRates;
use super::event::{EventCategory, EventRecord};
use super::grid::GridPolicy;
use super::kpi::RunSummary;
use super::power_balance::net_energy_kwh;
use super::recorder::Recorder;
use super::types::{FLOW_EPSILON_KWH, SimConfig, TimestepRecord, round_to};

/// Curtailment below this (kWh) is not worth an event.
const CURTAILMENT_EVENT_KWH: f64 = 0.01;

/// Mutable site state carried from one step to the next.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteState {
    pub battery: Battery,
    pub grid: GridPolicy,
    pub weather: WeatherState,
    pub inverter: Inverter,
    /// Day index of the last daily update, `None` before the first step.
    pub current_day: Option<u64>,
}

/// Everything a finished run hands to reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutput {
    pub timesteps: Vec<TimestepRecord>,
    pub events: Vec<EventRecord>,
    pub summary: RunSummary,
}

impl SimulationOutput {
    /// Splits off the `(timestep_log, event_log)` pair.
    pub fn into_logs(self) -> (Vec<TimestepRecord>, Vec<EventRecord>) {
        (self.timesteps, self.events)
    }
}

/// Simulation engine owning the site state, models, generator, and recorder.
///
/// A run is a strict sequential fold: each step reads the battery and grid
/// state left by the previous one. Every random draw comes from the single
/// `rng` seeded from `SimConfig::seed`, so a seed fixes both logs exactly.
pub struct Engine {
    config: SimConfig,
    strategy: DispatchStrategy,
    state: SiteState,
    solar: SolarArray,
    demand: DemandModel,
    rates: EconomicRates,
    rng: StdRng,
    recorder: Recorder,
}

impl Engine {
    /// Creates a new simulation engine.
    ///
    /// # Arguments
    ///
    /// * `config` - Step length, horizon, and seed
    /// * `strategy` - Surplus dispatch policy, fixed for the run
    /// * `battery` - Battery at its initial SoC
    /// * `solar` - PV array and inverter rating
    /// * `demand` - Household demand model
    /// * `weather` - Season and (initial) cloud state
    /// * `inverter` - Reliability model
    /// * `grid` - Export/import rules
    /// * `rates` - Tariff
    #[expect(clippy::too_many_arguments)]
    pub fn new(
        config: SimConfig,
        strategy: DispatchStrategy,
        battery: Battery,
        solar: SolarArray,
        demand: DemandModel,
        weather: WeatherState,
        inverter: Inverter,
        grid: GridPolicy,
        rates: EconomicRates,
    ) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        let recorder = Recorder::new(&battery, config.total_steps() as usize);
        Self {
            config,
            strategy,
            state: SiteState {
                battery,
                grid,
                weather,
                inverter,
                current_day: None,
            },
            solar,
            demand,
            rates,
            rng,
            recorder,
        }
    }

    /// Daily update at the first step of `day`: month roll, clouds, failure trial.
    fn start_day(&mut self, day: u64, time_min: u64) {
        self.state.current_day = Some(day);

        if self.state.grid.roll_month(day) {
            let month = self.state.grid.month_index();
            debug!(day, month, "export quota reset");
            self.recorder.event(
                time_min,
                EventCategory::MonthReset,
                format!(
                    "month {month} started, export quota {:.3} kWh restored",
                    self.state.grid.monthly_export_quota_kwh()
                ),
            );
        }

        let cloud = self.state.weather.resample(&mut self.rng);
        debug!(day, cloud, "daily weather update");
        self.recorder.event(
            time_min,
            EventCategory::DailyUpdate,
            format!("day {day}: cloud fraction {cloud:.4} ({})", self.state.weather.season),
        );

        if let Some(outage) = self.state.inverter.daily_trial(time_min, &mut self.rng) {
            debug!(day, hours = outage.duration_hours, "inverter failure");
            self.recorder.event(
                time_min,
                EventCategory::InverterFailure,
                format!(
                    "inverter failed for {:.2} h, offline until minute {}",
                    outage.duration_hours, outage.until_min
                ),
            );
        }
    }

    /// Executes one timestep at virtual time `time_min` and returns its record.
    ///
    /// The record is also appended to the recorder's timestep log.
    pub fn step(&mut self, time_min: u64) -> TimestepRecord {
        let dt_hours = self.config.dt_hours();
        let minute = minute_of_day(time_min);
        let day = day_index(time_min);

        // 1. Daily resampling on the first step of each day
        if self.state.current_day != Some(day) {
            self.start_day(day, time_min);
        }

        // 2. Inverter availability and recovery edge
        let inverter_ok = self.state.inverter.is_available(time_min);
        self.recorder.observe_inverter(time_min, inverter_ok);

        // 3. Generation and demand
        let cloud = self.state.weather.cloud_fraction;
        let solar_kw = self.solar.output_kw(minute, cloud, inverter_ok);
        let load_kw = self.demand.load_kw(minute, &mut self.rng);
        let net_kwh = net_energy_kwh(solar_kw, load_kw, dt_hours);

        // 4. Dispatch
        let soc_before = self.state.battery.soc_kwh;
        let out = dispatch(
            self.strategy,
            net_kwh,
            dt_hours,
            &mut self.state.battery,
            &mut self.state.grid,
        );
        self.state.battery.clamp();
        let soc_after = self.state.battery.soc_kwh;

        // 5. Transition bookkeeping
        self.recorder.observe_battery(time_min, &self.state.battery, &out);

        if out.curtailed_kwh > CURTAILMENT_EVENT_KWH {
            self.recorder.event(
                time_min,
                EventCategory::SolarCurtailment,
                format!("curtailed {:.4} kWh of surplus", out.curtailed_kwh),
            );
        }
        if out.unmet_kwh > FLOW_EPSILON_KWH {
            self.recorder.event(
                time_min,
                EventCategory::UnmetLoad,
                format!("{:.4} kWh of load unserved at import cap", out.unmet_kwh),
            );
        }
        if self
            .recorder
            .observe_soc_direction(time_min, net_kwh, soc_before, soc_after)
        {
            warn!(time_min, net_kwh, soc_before, soc_after, "SoC increased during a deficit");
        }

        // 6. Economics and record
        let money = self.rates.settle(out.import_kwh, out.export_kwh);
        self.recorder
            .accumulate(solar_kw * dt_hours, load_kw * dt_hours, &out, &money, inverter_ok);
        let battery = &self.state.battery;
        let record = TimestepRecord {
            time_min,
            hour: hour_of_day(time_min),
            solar_kw: round_to(solar_kw, 4),
            load_kw: round_to(load_kw, 4),
            energy_gen_kwh: round_to(solar_kw * dt_hours, 6),
            energy_load_kwh: round_to(load_kw * dt_hours, 6),
            net_kwh: round_to(net_kwh, 6),
            battery_soc_kwh: round_to(soc_after, 6),
            battery_soc_pct: round_to(battery.soc_fraction() * 100.0, 4),
            battery_charged_kwh: round_to(out.charged_kwh, 6),
            battery_discharged_kwh: round_to(out.discharged_kwh, 6),
            grid_import_kwh: round_to(out.import_kwh, 6),
            grid_export_kwh: round_to(out.export_kwh, 6),
            curtailed_kwh: round_to(out.curtailed_kwh, 6),
            unmet_load_kwh: round_to(out.unmet_kwh, 6),
            inverter_ok,
            cloud: round_to(cloud, 4),
            strategy: self.strategy,
            import_cost: round_to(money.import_cost, 6),
            export_revenue: round_to(money.export_revenue, 6),
            net_cost: round_to(money.net_cost, 6),
            month_exported_kwh: round_to(self.state.grid.exported_this_month_kwh(), 6),
        };
        self.recorder.record_step(record.clone());
        record
    }

    /// Executes every timestep of the horizon and returns both logs.
    pub fn run(mut self) -> SimulationOutput {
        info!(
            strategy = %self.strategy,
            steps = self.config.total_steps(),
            seed = self.config.seed,
            "simulation started"
        );
        self.recorder.event(
            0,
            EventCategory::SimulationStart,
            format!(
                "strategy={} dt={}min horizon={}min seed={} soc0={:.3} kWh",
                self.strategy,
                self.config.dt_minutes,
                self.config.total_minutes,
                self.config.seed,
                self.state.battery.soc_kwh
            ),
        );

        let mut clock = Clock::new(self.config.dt_minutes, self.config.total_minutes);
        clock.run(|t| {
            self.step(t);
        });

        let summary = RunSummary::from_totals(self.recorder.totals(), self.recorder.counters());
        self.recorder
            .event(clock.now(), EventCategory::SimulationEnd, summary.headline());
        info!(
            steps = summary.steps,
            import_kwh = summary.total_import_kwh,
            export_kwh = summary.total_export_kwh,
            net_cost = summary.total_net_cost,
            "simulation finished"
        );

        let (timesteps, events) = self.recorder.into_logs();
        SimulationOutput {
            timesteps,
            events,
            summary,
        }
    }

    /// Returns the current site state.
    pub fn state(&self) -> &SiteState {
        &self.state
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::Season;

    fn engine(strategy: DispatchStrategy, failure_frequency: f64) -> Engine {
        Engine::new(
            SimConfig::new(30, 3 * 1440, 42),
            strategy,
            Battery::new(5.0, 0.5, 0.05, 0.9),
            SolarArray::new(4.0, 5.0),
            DemandModel::new(0.9, 3.5),
            WeatherState::new(Season::Summer),
            Inverter::new(failure_frequency, 7.0),
            GridPolicy::new(5.0, 200.0, 2),
            EconomicRates::new(0.25, 0.08),
        )
    }

    fn count(events: &[EventRecord], category: EventCategory) -> usize {
        events.iter().filter(|e| e.category == category).count()
    }

    #[test]
    fn first_step_runs_daily_update() {
        let mut e = engine(DispatchStrategy::LoadPriority, 0.0);
        e.step(0);
        assert_eq!(e.state().current_day, Some(0));
        assert_eq!(count(e.recorder().events(), EventCategory::DailyUpdate), 1);
        e.step(30);
        assert_eq!(count(e.recorder().events(), EventCategory::DailyUpdate), 1);
    }

    #[test]
    fn run_brackets_log_with_start_and_end() {
        let out = engine(DispatchStrategy::LoadPriority, 0.0).run();
        assert_eq!(out.timesteps.len(), 144);
        assert_eq!(out.events.first().map(|e| e.category), Some(EventCategory::SimulationStart));
        assert_eq!(out.events.last().map(|e| e.category), Some(EventCategory::SimulationEnd));
        assert_eq!(out.events.last().map(|e| e.time_min), Some(3 * 1440));
        assert_eq!(count(&out.events, EventCategory::DailyUpdate), 3);
    }

    #[test]
    fn month_resets_on_month_boundaries() {
        // month length 2 days over a 3-day run: one reset at day 2
        let out = engine(DispatchStrategy::ProducePriority, 0.0).run();
        let resets: Vec<u64> = out
            .events
            .iter()
            .filter(|e| e.category == EventCategory::MonthReset)
            .map(|e| e.time_min)
            .collect();
        assert_eq!(resets, vec![2 * 1440]);
    }

    #[test]
    fn guaranteed_failure_takes_inverter_offline() {
        let out = engine(DispatchStrategy::LoadPriority, 1.0).run();
        assert!(count(&out.events, EventCategory::InverterFailure) >= 1);
        let first = &out.timesteps[0];
        assert!(!first.inverter_ok);
        assert_eq!(first.solar_kw, 0.0);
    }

    #[test]
    fn no_warnings_or_unmet_under_unconstrained_import() {
        for strategy in DispatchStrategy::ALL {
            let out = engine(strategy, 0.1).run();
            assert_eq!(count(&out.events, EventCategory::Warning), 0, "{strategy}");
            assert_eq!(count(&out.events, EventCategory::UnmetLoad), 0, "{strategy}");
            assert!(out.timesteps.iter().all(|r| r.unmet_load_kwh == 0.0));
        }
    }

    #[test]
    fn curtailment_is_logged_when_export_is_closed() {
        // charge_priority, battery at 95%, no export quota, oversized array
        let mut e = Engine::new(
            SimConfig::new(30, 1440, 7),
            DispatchStrategy::ChargePriority,
            Battery::new(5.0, 0.95, 0.05, 0.9),
            SolarArray::new(20.0, 20.0),
            DemandModel::new(0.9, 3.5),
            WeatherState::new(Season::Winter),
            Inverter::new(0.0, 7.0),
            GridPolicy::new(5.0, 0.0, 30),
            EconomicRates::new(0.25, 0.08),
        );
        let midnight = e.step(0);
        assert_eq!(midnight.curtailed_kwh, 0.0);
        let mut records = Vec::new();
        for t in (30..1440).step_by(30) {
            records.push(e.step(t));
        }
        assert!(records.iter().any(|r| r.curtailed_kwh > 0.0));
        assert!(records.iter().all(|r| r.grid_export_kwh == 0.0));
        assert!(count(e.recorder().events(), EventCategory::SolarCurtailment) > 0);
    }

    #[test]
    fn cycle_counts_match_start_events() {
        let out = engine(DispatchStrategy::ChargePriority, 0.0).run();
        assert_eq!(
            out.summary.charge_cycles as usize,
            count(&out.events, EventCategory::BatteryChargeStart)
        );
        assert_eq!(
            out.summary.discharge_cycles as usize,
            count(&out.events, EventCategory::BatteryDischargeStart)
        );
    }
}
