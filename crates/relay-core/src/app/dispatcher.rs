//! Dispatcher - command event から outbound HTTP への解決と実行
//!
//! # フロー
//! 1. registry の snapshot を取る
//! 2. entity を claim する provider が無ければ即 return（url() は呼ばない、ログも出さない）
//! 3. 同じ snapshot を先頭から走査し、URL を返す最初の provider を勝者にする
//! 4. URL が無ければ warn を出して return
//! 5. 勝者の provider から method を取り、両方 non-blank なら executor へ渡す

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, debug_span, trace, warn};

use crate::app::registry::ProviderRegistry;
use crate::domain::action::is_blank;
use crate::domain::{Command, CommandEvent, DispatchOutcome, ResolvedAction};
use crate::observability::{DispatchCounters, DispatchCounts};
use crate::ports::{HttpExecutor, MappingProvider};

/// Timeout handed to the executor with every request.
pub const SOCKET_TIMEOUT: Duration = Duration::from_millis(5000);

/// Turns command events into at most one HTTP call each.
///
/// `dispatch` never fails and never waits for the network. The only state
/// kept between calls is the outcome counters.
pub struct Dispatcher {
    registry: Arc<ProviderRegistry>,
    executor: Arc<dyn HttpExecutor>,
    counters: DispatchCounters,
}

enum Resolution {
    /// No provider claims the entity.
    Unbound,
    /// Some provider claims the entity, none has a URL for the command.
    NoMapping,
    Matched {
        provider: Arc<dyn MappingProvider>,
        url: String,
    },
}

impl Dispatcher {
    pub fn new(registry: Arc<ProviderRegistry>, executor: Arc<dyn HttpExecutor>) -> Self {
        Self {
            registry,
            executor,
            counters: DispatchCounters::default(),
        }
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    pub fn add_provider(&self, provider: Arc<dyn MappingProvider>) -> bool {
        self.registry.add(provider)
    }

    pub fn remove_provider(&self, provider: &Arc<dyn MappingProvider>) -> bool {
        self.registry.remove(provider)
    }

    pub fn counts(&self) -> DispatchCounts {
        self.counters.snapshot()
    }

    pub fn handle(&self, event: &CommandEvent) -> DispatchOutcome {
        self.dispatch(event.entity_name(), event.command())
    }

    /// Resolve `command` for `entity_name` and, if a complete mapping exists,
    /// hand it to the executor.
    pub fn dispatch(&self, entity_name: &str, command: &Command) -> DispatchOutcome {
        let span = debug_span!("dispatch", entity = entity_name, command = %command);
        let _entered = span.enter();

        let outcome = self.dispatch_inner(entity_name, command.as_str());
        self.counters.record(outcome.kind());
        outcome
    }

    fn dispatch_inner(&self, entity_name: &str, command: &str) -> DispatchOutcome {
        let providers = self.registry.snapshot();

        let (provider, url) = match resolve(&providers, entity_name, command) {
            Resolution::Unbound => {
                trace!("no provider claims entity");
                return DispatchOutcome::FastRejected;
            }
            Resolution::NoMapping => {
                warn!(
                    entity = entity_name,
                    command, "doesn't find matching binding provider"
                );
                return DispatchOutcome::Unresolved;
            }
            Resolution::Matched { provider, url } => (provider, url),
        };

        let method = provider.http_method(entity_name, command);
        let Some(action) = ResolvedAction::from_parts(method, Some(url)) else {
            trace!("mapping has a blank method, skipping");
            return DispatchOutcome::ResolvedInvalid;
        };

        debug!(method = action.method(), url = action.url(), "executing");
        self.executor
            .execute(action.method(), action.url(), SOCKET_TIMEOUT);
        DispatchOutcome::Executed(action)
    }
}

/// Two scans over the same snapshot.
///
/// URLs are only queried once some provider claims the entity, so unbound
/// entities cost one `provides_binding_for` call per provider. The winner is
/// the first provider (in registry order) with a non-blank URL for the pair,
/// whether or not that provider is itself the one claiming the entity.
fn resolve(providers: &[Arc<dyn MappingProvider>], entity_name: &str, command: &str) -> Resolution {
    if !providers.iter().any(|p| p.provides_binding_for(entity_name)) {
        return Resolution::Unbound;
    }

    providers
        .iter()
        .find_map(|provider| {
            provider
                .url(entity_name, command)
                .filter(|url| !is_blank(url))
                .map(|url| Resolution::Matched {
                    provider: Arc::clone(provider),
                    url,
                })
        })
        .unwrap_or(Resolution::NoMapping)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HttpRule, RuleTable};
    use crate::impls::{ExecutedRequest, RecordingExecutor, StaticMappingProvider};
    use rstest::rstest;
    use std::io;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use tracing::Level;

    fn static_provider(table: RuleTable) -> Arc<dyn MappingProvider> {
        Arc::new(StaticMappingProvider::from_table(table))
    }

    fn lamp_provider() -> Arc<dyn MappingProvider> {
        static_provider(RuleTable::new().with_rule(
            "Lamp1",
            "ON",
            HttpRule::new("GET", "http://bulb/on"),
        ))
    }

    fn dispatcher_with(
        providers: &[Arc<dyn MappingProvider>],
    ) -> (Dispatcher, Arc<RecordingExecutor>) {
        let registry = Arc::new(ProviderRegistry::new());
        for p in providers {
            registry.add(p.clone());
        }
        let executor = Arc::new(RecordingExecutor::new());
        (Dispatcher::new(registry, executor.clone()), executor)
    }

    #[test]
    fn lamp_scenario() {
        let (dispatcher, executor) = dispatcher_with(&[lamp_provider()]);

        let on = dispatcher.dispatch("Lamp1", &Command::new("ON"));
        assert!(on.is_executed());
        assert_eq!(
            executor.requests(),
            vec![ExecutedRequest {
                method: "GET".into(),
                url: "http://bulb/on".into(),
                timeout: Duration::from_millis(5000),
            }]
        );

        let off = dispatcher.dispatch("Lamp1", &Command::new("OFF"));
        assert_eq!(off, DispatchOutcome::Unresolved);

        let unknown = dispatcher.dispatch("Unknown", &Command::new("ON"));
        assert_eq!(unknown, DispatchOutcome::FastRejected);

        assert_eq!(executor.len(), 1);
        let counts = dispatcher.counts();
        assert_eq!(counts.executed, 1);
        assert_eq!(counts.unresolved, 1);
        assert_eq!(counts.fast_rejected, 1);
        assert_eq!(counts.resolved_invalid, 0);
    }

    #[test]
    fn empty_registry_fast_rejects() {
        let (dispatcher, executor) = dispatcher_with(&[]);
        let outcome = dispatcher.dispatch("Lamp1", &Command::new("ON"));
        assert_eq!(outcome, DispatchOutcome::FastRejected);
        assert!(executor.is_empty());
    }

    #[rstest]
    #[case::missing_url(HttpRule { method: Some("GET".into()), url: None })]
    #[case::empty_url(HttpRule::new("GET", ""))]
    #[case::whitespace_url(HttpRule::new("GET", "  "))]
    fn blank_or_absent_url_everywhere_is_unresolved(#[case] rule: HttpRule) {
        let blank = static_provider(RuleTable::new().with_rule("Lamp1", "ON", rule));
        let unrelated = static_provider(RuleTable::new().with_rule(
            "Lamp1",
            "OFF",
            HttpRule::new("GET", "http://bulb/off"),
        ));
        let (dispatcher, executor) = dispatcher_with(&[blank, unrelated]);

        let outcome = dispatcher.dispatch("Lamp1", &Command::new("ON"));
        assert_eq!(outcome, DispatchOutcome::Unresolved);
        assert!(executor.is_empty());
    }

    #[rstest]
    #[case::matching_first(true)]
    #[case::matching_last(false)]
    fn provider_with_url_wins_in_either_order(#[case] matching_first: bool) {
        let a = lamp_provider();
        let b = static_provider(RuleTable::new().with_rule(
            "Lamp1",
            "OFF",
            HttpRule::new("POST", "http://other/off"),
        ));
        let providers = if matching_first { [a, b] } else { [b, a] };
        let (dispatcher, executor) = dispatcher_with(&providers);

        let outcome = dispatcher.dispatch("Lamp1", &Command::new("ON"));
        let action = outcome.action().unwrap();
        assert_eq!(action.method(), "GET");
        assert_eq!(action.url(), "http://bulb/on");
        assert_eq!(executor.len(), 1);
    }

    #[test]
    fn first_registered_wins_when_several_match() {
        let first = static_provider(RuleTable::new().with_rule(
            "Lamp1",
            "ON",
            HttpRule::new("GET", "http://first/on"),
        ));
        let second = static_provider(RuleTable::new().with_rule(
            "Lamp1",
            "ON",
            HttpRule::new("PUT", "http://second/on"),
        ));
        let (dispatcher, executor) = dispatcher_with(&[first, second]);

        for _ in 0..3 {
            dispatcher.dispatch("Lamp1", &Command::new("ON"));
        }
        let requests = executor.requests();
        assert_eq!(requests.len(), 3);
        assert!(requests.iter().all(|r| r.url == "http://first/on" && r.method == "GET"));
    }

    #[rstest]
    #[case::missing_method(None)]
    #[case::empty_method(Some(""))]
    #[case::whitespace_method(Some("\t "))]
    fn blank_method_skips_silently(#[case] method: Option<&str>) {
        let provider = static_provider(RuleTable::new().with_rule(
            "Lamp1",
            "ON",
            HttpRule {
                method: method.map(String::from),
                url: Some("http://bulb/on".into()),
            },
        ));
        let (dispatcher, executor) = dispatcher_with(&[provider]);

        let outcome = dispatcher.dispatch("Lamp1", &Command::new("ON"));
        assert_eq!(outcome, DispatchOutcome::ResolvedInvalid);
        assert!(executor.is_empty());
        assert_eq!(dispatcher.counts().resolved_invalid, 1);
    }

    #[test]
    fn method_comes_from_the_url_winner() {
        // the winner has no method; a later provider's method must not be borrowed
        let winner = static_provider(RuleTable::new().with_rule(
            "Lamp1",
            "ON",
            HttpRule {
                method: None,
                url: Some("http://winner/on".into()),
            },
        ));
        let later = static_provider(RuleTable::new().with_rule(
            "Lamp1",
            "ON",
            HttpRule::new("GET", "http://later/on"),
        ));
        let (dispatcher, executor) = dispatcher_with(&[winner, later]);

        let outcome = dispatcher.dispatch("Lamp1", &Command::new("ON"));
        assert_eq!(outcome, DispatchOutcome::ResolvedInvalid);
        assert!(executor.is_empty());
    }

    /// Claims every entity but maps nothing.
    struct ClaimAll;

    impl MappingProvider for ClaimAll {
        fn provides_binding_for(&self, _entity_name: &str) -> bool {
            true
        }
        fn http_method(&self, _entity_name: &str, _command: &str) -> Option<String> {
            None
        }
        fn url(&self, _entity_name: &str, _command: &str) -> Option<String> {
            None
        }
    }

    /// Has URLs but never claims an entity.
    struct UrlOnly;

    impl MappingProvider for UrlOnly {
        fn provides_binding_for(&self, _entity_name: &str) -> bool {
            false
        }
        fn http_method(&self, _entity_name: &str, _command: &str) -> Option<String> {
            Some("POST".into())
        }
        fn url(&self, entity_name: &str, command: &str) -> Option<String> {
            Some(format!("http://url-only/{entity_name}/{command}"))
        }
    }

    #[test]
    fn url_without_any_claim_is_fast_rejected() {
        let url_only: Arc<dyn MappingProvider> = Arc::new(UrlOnly);
        let (dispatcher, executor) = dispatcher_with(&[url_only]);
        let outcome = dispatcher.dispatch("Lamp1", &Command::new("ON"));
        assert_eq!(outcome, DispatchOutcome::FastRejected);
        assert!(executor.is_empty());
    }

    #[test]
    fn url_provider_wins_when_another_provider_claims() {
        let url_only: Arc<dyn MappingProvider> = Arc::new(UrlOnly);
        let claim_all: Arc<dyn MappingProvider> = Arc::new(ClaimAll);
        let (dispatcher, executor) = dispatcher_with(&[url_only, claim_all]);
        let outcome = dispatcher.dispatch("Lamp1", &Command::new("ON"));
        assert_eq!(outcome.action().unwrap().url(), "http://url-only/Lamp1/ON");
        assert_eq!(executor.len(), 1);
    }

    /// Claims "Lamp1" only and counts how often its URL is looked up.
    #[derive(Default)]
    struct CountingLamp {
        url_calls: AtomicUsize,
    }

    impl MappingProvider for CountingLamp {
        fn provides_binding_for(&self, entity_name: &str) -> bool {
            entity_name == "Lamp1"
        }
        fn http_method(&self, _entity_name: &str, _command: &str) -> Option<String> {
            Some("GET".into())
        }
        fn url(&self, entity_name: &str, command: &str) -> Option<String> {
            self.url_calls.fetch_add(1, Ordering::SeqCst);
            (entity_name == "Lamp1" && command == "ON").then(|| "http://bulb/on".to_string())
        }
    }

    #[test]
    fn unbound_entity_never_queries_urls() {
        let first = Arc::new(CountingLamp::default());
        let second = Arc::new(CountingLamp::default());
        let providers: [Arc<dyn MappingProvider>; 2] = [first.clone(), second.clone()];
        let (dispatcher, executor) = dispatcher_with(&providers);

        let outcome = dispatcher.dispatch("Unknown", &Command::new("ON"));
        assert_eq!(outcome, DispatchOutcome::FastRejected);
        assert_eq!(first.url_calls.load(Ordering::SeqCst), 0);
        assert_eq!(second.url_calls.load(Ordering::SeqCst), 0);
        assert!(executor.is_empty());

        // bound entity: the URL scan stops at the first match
        assert!(dispatcher.dispatch("Lamp1", &Command::new("ON")).is_executed());
        assert_eq!(first.url_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.url_calls.load(Ordering::SeqCst), 0);
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Runs `f` with a DEBUG-level subscriber and returns what it logged.
    fn captured_logs(f: impl FnOnce()) -> String {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(Level::DEBUG)
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn unresolved_logs_a_warning() {
        let (dispatcher, _executor) = dispatcher_with(&[lamp_provider()]);
        let logs = captured_logs(|| {
            dispatcher.dispatch("Lamp1", &Command::new("OFF"));
        });
        assert!(logs.contains("WARN"), "got: {logs}");
        assert!(logs.contains("doesn't find matching binding provider"), "got: {logs}");
        assert!(logs.contains("Lamp1") && logs.contains("OFF"), "got: {logs}");
    }

    #[rstest]
    #[case::unbound_entity("Unknown", "ON", None)]
    #[case::blank_method("Lamp1", "ON", Some(HttpRule { method: Some(" ".into()), url: Some("http://bulb/on".into()) }))]
    fn quiet_outcomes_log_nothing_above_trace(
        #[case] entity: &str,
        #[case] command: &str,
        #[case] rule: Option<HttpRule>,
    ) {
        let table = match rule {
            Some(rule) => RuleTable::new().with_rule("Lamp1", "ON", rule),
            None => RuleTable::new().with_rule("Lamp1", "ON", HttpRule::new("GET", "http://bulb/on")),
        };
        let (dispatcher, executor) = dispatcher_with(&[static_provider(table)]);

        let logs = captured_logs(|| {
            assert!(!dispatcher.dispatch(entity, &Command::new(command)).is_executed());
        });
        assert!(logs.is_empty(), "got: {logs}");
        assert!(executor.is_empty());
    }

    #[test]
    fn handle_forwards_event() {
        let (dispatcher, executor) = dispatcher_with(&[lamp_provider()]);
        let outcome = dispatcher.handle(&CommandEvent::new("Lamp1", "ON"));
        assert!(outcome.is_executed());
        assert_eq!(executor.requests()[0].timeout, SOCKET_TIMEOUT);
    }

    #[test]
    fn providers_can_be_added_and_removed_through_dispatcher() {
        let (dispatcher, executor) = dispatcher_with(&[]);
        let lamp = lamp_provider();

        assert!(dispatcher.add_provider(lamp.clone()));
        assert!(dispatcher.dispatch("Lamp1", &Command::new("ON")).is_executed());

        assert!(dispatcher.remove_provider(&lamp));
        assert_eq!(
            dispatcher.dispatch("Lamp1", &Command::new("ON")),
            DispatchOutcome::FastRejected
        );
        assert_eq!(executor.len(), 1);
        assert!(dispatcher.registry().is_empty());
    }

    #[test]
    fn concurrent_registry_churn_during_dispatch() {
        const MUTATORS: usize = 4;
        const DISPATCHERS: usize = 4;
        const ROUNDS: usize = 250;

        let (dispatcher, executor) = dispatcher_with(&[lamp_provider()]);
        let dispatcher = Arc::new(dispatcher);

        let mut handles = Vec::new();
        for i in 0..MUTATORS {
            let dispatcher = dispatcher.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..ROUNDS {
                    // claims Lamp1 but can never win the ON lookup
                    let churn = static_provider(RuleTable::new().with_rule(
                        "Lamp1",
                        "OFF",
                        HttpRule::new("GET", format!("http://churn{i}/off")),
                    ));
                    dispatcher.add_provider(churn.clone());
                    dispatcher.remove_provider(&churn);
                }
            }));
        }
        for _ in 0..DISPATCHERS {
            let dispatcher = dispatcher.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..ROUNDS {
                    let outcome = dispatcher.dispatch("Lamp1", &Command::new("ON"));
                    assert_eq!(outcome.action().unwrap().url(), "http://bulb/on");
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(executor.len(), DISPATCHERS * ROUNDS);
        assert_eq!(dispatcher.counts().executed, (DISPATCHERS * ROUNDS) as u64);
        assert_eq!(dispatcher.registry().len(), 1);
    }
}
