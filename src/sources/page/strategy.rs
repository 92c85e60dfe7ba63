use scraper::Html;

/// A field value together with the name of the strategy that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub value: T,
    pub strategy: &'static str,
}

impl<T> Resolved<T> {
    pub fn new(value: T, strategy: &'static str) -> Self {
        Self { value, strategy }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolved<U> {
        Resolved {
            value: f(self.value),
            strategy: self.strategy,
        }
    }
}

type Strategy<'a, T> = Box<dyn Fn(&Html) -> Option<T> + 'a>;

/// Ordered, named extraction heuristics for one field.
///
/// Strategies run in insertion order and the first `Some` wins.
pub struct StrategyChain<'a, T> {
    field: &'static str,
    strategies: Vec<(&'static str, Strategy<'a, T>)>,
}

impl<'a, T> StrategyChain<'a, T> {
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            strategies: Vec::new(),
        }
    }

    pub fn then(mut self, name: &'static str, strategy: impl Fn(&Html) -> Option<T> + 'a) -> Self {
        self.strategies.push((name, Box::new(strategy)));
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|(name, _)| *name).collect()
    }

    pub fn resolve(&self, document: &Html) -> Option<Resolved<T>> {
        for (name, strategy) in &self.strategies {
            if let Some(value) = strategy(document) {
                tracing::debug!(field = self.field, strategy = *name, "field resolved");
                return Some(Resolved::new(value, *name));
            }
            tracing::trace!(field = self.field, strategy = *name, "strategy yielded nothing");
        }
        None
    }

    /// Resolve, or fall back to `default` reported under `fallback_name`
    pub fn resolve_or_else(
        &self,
        document: &Html,
        fallback_name: &'static str,
        default: impl FnOnce() -> T,
    ) -> Resolved<T> {
        self.resolve(document).unwrap_or_else(|| {
            tracing::debug!(field = self.field, strategy = fallback_name, "using fallback");
            Resolved::new(default(), fallback_name)
        })
    }
}
