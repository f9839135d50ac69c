//! Metrics definitions for the rollout service.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Histogram,
}

impl MetricType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MetricType::Counter => "Counter",
            MetricType::Histogram => "Histogram",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MetricDef {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub description: &'static str,
}

#[macro_export]
macro_rules! counter {
    ($def:expr $(, $key:literal => $value:expr)* $(,)?) => {
        metrics::counter!($def.name $(, $key => $value)*)
    };
}

#[macro_export]
macro_rules! histogram {
    ($def:expr $(, $key:literal => $value:expr)* $(,)?) => {
        metrics::histogram!($def.name $(, $key => $value)*)
    };
}

pub const FEATURE_EVALUATIONS: MetricDef = MetricDef {
    name: "feature.evaluations",
    metric_type: MetricType::Counter,
    description: "Number of feature decisions. Tagged with feature, enabled.",
};

pub const IDENTIFIER_MISSING: MetricDef = MetricDef {
    name: "identifier.missing",
    metric_type: MetricType::Counter,
    description: "Requests without an identifier. Tagged with endpoint.",
};

pub const IDENTIFIER_GENERATED: MetricDef = MetricDef {
    name: "identifier.generated",
    metric_type: MetricType::Counter,
    description: "Identifiers generated for anonymous requests",
};

pub const REQUEST_DURATION: MetricDef = MetricDef {
    name: "request.duration",
    metric_type: MetricType::Histogram,
    description: "Request duration in seconds. Tagged with endpoint, status.",
};

pub const ALL_METRICS: &[MetricDef] = &[
    FEATURE_EVALUATIONS,
    IDENTIFIER_MISSING,
    IDENTIFIER_GENERATED,
    REQUEST_DURATION,
];
