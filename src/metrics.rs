use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use once_cell::sync::Lazy;
use prometheus::{Encoder, Opts, TextEncoder};

/// Register additional metrics of our own structs by using this registry instance.
static REGISTRY: Lazy<Registry> = Lazy::new(|| Registry(prometheus::Registry::new()));

// Export special preconstructed counters for Teloxide's handlers.
pub static CMD_START_COUNTER: Lazy<Counter> = Lazy::new(|| {
    Counter::new("command_start", Opts::new("command_start_usage_total", "count of /start invocations"))
});
pub static CMD_HELP_COUNTER: Lazy<Counter> = Lazy::new(|| {
    Counter::new("command_help", Opts::new("command_help_usage_total", "count of /help invocations"))
});
pub static CMD_ADMIN_COUNTER: Lazy<Counter> = Lazy::new(|| {
    Counter::new("command_admin", Opts::new("command_admin_usage_total", "count of /admin invocations by admins"))
});
pub static SEARCH_COUNTER: Lazy<ComplexCommandCounters> = Lazy::new(|| {
    let opts = Opts::new("search_usage_total", "count of search queries and successful lookups");
    ComplexCommandCounters {
        invoked: Counter::new("search (invoked)", opts.clone().const_label("state", "invoked")),
        finished: Counter::new("search (found)", opts.const_label("state", "found")),
    }
});
pub static BROADCAST_COUNTER: Lazy<BroadcastCounters> = Lazy::new(|| {
    let opts = Opts::new("broadcast_usage_total", "count of broadcasts by their state");
    BroadcastCounters {
        started: Counter::new("broadcast (started)", opts.clone().const_label("state", "started")),
        cancelled: Counter::new("broadcast (cancelled)", opts.clone().const_label("state", "cancelled")),
        finished: Counter::new("broadcast (finished)", opts.const_label("state", "finished")),
    }
});
pub static BROADCAST_DELIVERIES: Lazy<DeliveryCounters> = Lazy::new(|| {
    let opts = Opts::new("broadcast_deliveries_total", "count of broadcast delivery attempts by their status");
    DeliveryCounters {
        delivered: Counter::new("broadcast deliveries (delivered)", opts.clone().const_label("status", "delivered")),
        undeliverable: Counter::new("broadcast deliveries (undeliverable)", opts.const_label("status", "undeliverable")),
    }
});


pub fn init() -> axum::Router {
    let prometheus = REGISTRY
        .register(&CMD_START_COUNTER)
        .register(&CMD_HELP_COUNTER)
        .register(&CMD_ADMIN_COUNTER)
        .register(&SEARCH_COUNTER.invoked)
        .register(&SEARCH_COUNTER.finished)
        .register(&BROADCAST_COUNTER.started)
        .register(&BROADCAST_COUNTER.cancelled)
        .register(&BROADCAST_COUNTER.finished)
        .register(&BROADCAST_DELIVERIES.delivered)
        .register(&BROADCAST_DELIVERIES.undeliverable)
        .unwrap();

    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
    axum::Router::new()
        .route("/metrics", get(|| async move {
            let mut buffer = vec![];
            let metrics = prometheus.gather();
            if let Err(e) = TextEncoder::new().encode(&metrics, &mut buffer) {
                log::error!("couldn't encode custom metrics: {e}");
            }
            let custom_metrics = String::from_utf8_lossy(&buffer);

            metric_handle.render() + &custom_metrics
        }))
        .layer(prometheus_layer)
}

pub struct Counter {
    inner: prometheus::Counter,
    name: String
}
pub struct ComplexCommandCounters {
    invoked: Counter,
    finished: Counter,
}
pub struct BroadcastCounters {
    pub started: Counter,
    pub cancelled: Counter,
    pub finished: Counter,
}
pub struct DeliveryCounters {
    pub delivered: Counter,
    pub undeliverable: Counter,
}
struct Registry(prometheus::Registry);

impl Counter {
    fn new(name: &str, opts: Opts) -> Counter {
        let c = prometheus::Counter::with_opts(opts)
            .unwrap_or_else(|e| panic!("unable to create {name} counter: {e}"));
        Counter { inner: c, name: name.to_string() }
    }

    pub fn inc(&self) {
        self.inner.inc()
    }
}

impl ComplexCommandCounters {
    pub fn invoked(&self) {
        self.invoked.inc()
    }

    pub fn finished(&self) {
        self.finished.inc()
    }
}

impl Registry {
    fn register(&self, counter: &Counter) -> &Self {
        self.0.register(Box::new(counter.inner.clone()))
            .unwrap_or_else(|e| panic!("unable to register the {} counter: {e}", counter.name));
        self
    }

    fn unwrap(&self) -> prometheus::Registry {
        self.0.clone()
    }
}

#[cfg(test)]
mod test {
    use prometheus::core::Collector;
    use super::{Counter, BROADCAST_COUNTER};

    fn state_label(counter: &Counter) -> String {
        counter.inner.desc()[0].const_label_pairs[0].get_value().to_owned()
    }

    #[test]
    fn broadcast_states() {
        let states: Vec<String> = [&BROADCAST_COUNTER.started, &BROADCAST_COUNTER.cancelled, &BROADCAST_COUNTER.finished]
            .into_iter()
            .map(state_label)
            .collect();
        assert_eq!(states, ["started", "cancelled", "finished"]);
    }
}
