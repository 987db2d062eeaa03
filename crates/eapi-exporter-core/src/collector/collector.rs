//! Scrape orchestration across targets and modules.

use std::sync::{Arc, PoisonError};
use std::time::Duration;

use tracing::{debug, info};

use super::modules::ScrapeContext;
use super::probe::identity_samples;
use super::registry::ModuleSelection;
use super::session::SessionRegistry;
use super::timing::{BASE_COLLECTOR, ScrapeTiming};
use super::transport::{Connector, HttpConnector};
use crate::config::DeviceSettings;
use crate::metrics::MetricSample;

/// Sessions unused for this long are dropped at the start of the next scrape.
const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(3600);

/// Runs scrapes against any number of switches.
///
/// Sessions persist across scrapes; each target's session is locked for the
/// whole of its collection so concurrent scrapes of one switch serialize.
pub struct Collector {
    sessions: SessionRegistry,
}

impl Collector {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            sessions: SessionRegistry::new(connector),
        }
    }

    /// Collector talking eAPI over HTTP(S).
    pub fn with_http(settings: DeviceSettings) -> Self {
        Self::new(Arc::new(HttpConnector::new(settings)))
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Scrapes every target with the selected modules.
    ///
    /// Returns module samples first, then scrape durations, then the `up`
    /// and `hw` samples of every target. A down target contributes only its
    /// base probe duration and `up`/`hw`.
    pub fn collect(&self, targets: &[String], selection: &ModuleSelection) -> Vec<MetricSample> {
        self.sessions.evict_idle(SESSION_IDLE_TIMEOUT);

        let mut module_samples = Vec::new();
        let mut base_samples = Vec::new();
        let mut timing = ScrapeTiming::default();

        for target in targets {
            let session = self.sessions.session(target);
            let mut session = session.lock().unwrap_or_else(PoisonError::into_inner);

            let identity = timing.time(BASE_COLLECTOR, target, || session.probe());
            base_samples.extend(identity_samples(target, identity.as_ref()));

            let Some(identity) = identity else {
                info!(switch = %target, "switch is down, skipping modules");
                continue;
            };

            let mut ctx = ScrapeContext::new(&mut *session, &identity);
            for module in selection.modules() {
                let samples = timing.time(module.name(), target, || module.collect(&mut ctx));
                debug!(
                    switch = %target,
                    module = module.name(),
                    samples = samples.len(),
                    "module done"
                );
                module_samples.extend(samples);
            }
        }

        debug!(
            targets = targets.len(),
            samples = module_samples.len(),
            elapsed = ?timing.total(),
            "scrape finished"
        );

        module_samples.extend(timing.into_samples());
        module_samples.extend(base_samples);
        module_samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockSwitch;
    use crate::collector::registry::{ModuleId, UnknownModule};

    fn targets(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn families(samples: &[MetricSample]) -> Vec<&'static str> {
        let mut names: Vec<_> = samples.iter().map(|s| s.family.name).collect();
        names.dedup();
        names
    }

    #[test]
    fn down_target_only_reports_base() {
        let switch = MockSwitch::typical_switch();
        switch.set_unreachable("sw1");
        let collector = Collector::new(Arc::new(switch.clone()));

        let samples = collector.collect(&targets(&["sw1"]), &ModuleSelection::all());

        assert_eq!(
            families(&samples),
            vec!["arista_scrape_duration_seconds", "arista_up", "arista_hw"]
        );
        assert_eq!(samples[0].label("collector"), Some(BASE_COLLECTOR));
        assert_eq!(samples[1].gauge_value(), Some(0.0));
        assert_eq!(samples[2].label("serial"), Some("unknown"));
        assert!(switch.commands_for("sw1").is_empty());
    }

    #[test]
    fn unknown_module_names_are_ignored() {
        let collector = Collector::new(Arc::new(MockSwitch::typical_switch()));
        let selection = ModuleSelection::parse(Some("memory,bogus,port"));
        assert_eq!(selection.unknown(), &[UnknownModule("bogus".to_string())]);

        let samples = collector.collect(&targets(&["sw1"]), &selection);

        assert!(samples.iter().any(|s| s.family.name == "arista_mem_total"));
        assert!(samples.iter().any(|s| s.family.name == "arista_admin_up"));
        assert!(!samples.iter().any(|s| s.family.name.starts_with("arista_tcam")));
        assert!(!samples.iter().any(|s| s.family.name.starts_with("arista_bgp")));

        let timed: Vec<_> = samples
            .iter()
            .filter_map(|s| s.label("collector"))
            .collect();
        assert_eq!(timed, vec!["base", "memory", "port"]);
    }

    #[test]
    fn output_order_modules_then_durations_then_base() {
        let collector = Collector::new(Arc::new(MockSwitch::typical_switch()));
        let selection = ModuleSelection::parse(Some("memory"));
        let samples = collector.collect(&targets(&["sw1"]), &selection);

        assert_eq!(
            families(&samples),
            vec![
                "arista_mem_total",
                "arista_mem_free",
                "arista_scrape_duration_seconds",
                "arista_up",
                "arista_hw",
            ]
        );
    }

    #[test]
    fn one_down_target_does_not_affect_others() {
        let switch = MockSwitch::typical_switch();
        switch.set_unreachable("sw2");
        let collector = Collector::new(Arc::new(switch));
        let selection = ModuleSelection::parse(Some("tcam"));

        let samples = collector.collect(&targets(&["sw1", "sw2", "sw3"]), &selection);

        let up = |t: &str| {
            samples
                .iter()
                .find(|s| s.family.name == "arista_up" && s.label("target") == Some(t))
                .and_then(MetricSample::gauge_value)
        };
        assert_eq!(up("sw1"), Some(1.0));
        assert_eq!(up("sw2"), Some(0.0));
        assert_eq!(up("sw3"), Some(1.0));

        let tcam_targets: Vec<_> = samples
            .iter()
            .filter(|s| s.family.name == "arista_tcam_used")
            .filter_map(|s| s.label("target"))
            .collect();
        assert_eq!(tcam_targets, vec!["sw1", "sw1", "sw3", "sw3"]);
        assert_eq!(collector.sessions().len(), 3);
    }

    #[test]
    fn repeated_scrapes_are_stable() {
        let switch = MockSwitch::typical_switch();
        let collector = Collector::new(Arc::new(switch.clone()));
        let selection = ModuleSelection::all();

        let strip = |samples: Vec<MetricSample>| -> Vec<MetricSample> {
            samples
                .into_iter()
                .filter(|s| s.family.name != "arista_scrape_duration_seconds")
                .collect()
        };
        let first = strip(collector.collect(&targets(&["sw1"]), &selection));
        let second = strip(collector.collect(&targets(&["sw1"]), &selection));

        assert_eq!(first, second);
        assert_eq!(switch.connect_count(), 1);
    }

    #[test]
    fn concurrent_scrapes_of_one_switch_do_not_interleave() {
        let switch = MockSwitch::typical_switch();
        let collector = Arc::new(Collector::new(Arc::new(switch.clone())));
        let selection = ModuleSelection::parse(Some("tcam,port,power"));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let collector = collector.clone();
                let selection = selection.clone();
                std::thread::spawn(move || {
                    for _ in 0..5 {
                        collector.collect(&targets(&["sw1"]), &selection);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let scrape = [
            "show version",
            "show hardware capacity",
            "show interfaces",
            "show environment power",
        ];
        let history = switch.commands_for("sw1");
        assert_eq!(history.len(), 20 * scrape.len());
        for chunk in history.chunks(scrape.len()) {
            assert_eq!(chunk, scrape);
        }
    }

    #[test]
    fn every_module_times_itself() {
        let collector = Collector::new(Arc::new(MockSwitch::typical_switch()));
        let samples = collector.collect(&targets(&["sw1"]), &ModuleSelection::all());

        let mut timed: Vec<_> = samples
            .iter()
            .filter_map(|s| s.label("collector"))
            .collect();
        timed.sort();
        let mut expected: Vec<_> = ModuleId::ALL.iter().map(|m| m.name()).collect();
        expected.push(BASE_COLLECTOR);
        expected.sort();
        assert_eq!(timed, expected);
    }
}
