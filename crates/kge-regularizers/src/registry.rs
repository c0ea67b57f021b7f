//! Registry mapping regularizer names to factories and parameter metadata.
//!
//! The registry is an explicit value: build it once at startup (usually with
//! [`RegularizerRegistry::with_builtin`]) and pass it by reference to whatever
//! constructs regularizers.

use std::collections::BTreeMap;
use std::fmt;

use kge_core::{Hyperparams, KgeError, ParamValue, Result};

use crate::regularizer::{
    log_summary, L1Regularizer, L2Regularizer, L3Regularizer, NoRegularizer, Regularizer, LAMBDA,
};
use crate::weights::DEFAULT_LAMBDA;

/// Builds a regularizer from a hyperparameter mapping with defaults applied.
pub type RegularizerFactory = fn(&Hyperparams) -> Result<Box<dyn Regularizer>>;

/// An externally supplied hyperparameter declared by a registry entry.
#[derive(Debug, Clone, PartialEq)]
pub struct HyperparamSpec {
    name: String,
    default: Option<ParamValue>,
}

impl HyperparamSpec {
    /// A hyperparameter that must be supplied.
    pub fn required(name: &str) -> Self {
        Self {
            name: name.to_string(),
            default: None,
        }
    }

    /// A hyperparameter that falls back to `default` when absent.
    pub fn with_default(name: &str, default: impl Into<ParamValue>) -> Self {
        Self {
            name: name.to_string(),
            default: Some(default.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_value(&self) -> Option<&ParamValue> {
        self.default.as_ref()
    }
}

/// A registered regularizer.
#[derive(Clone)]
pub struct RegistryEntry {
    name: String,
    factory: RegularizerFactory,
    external_params: Vec<HyperparamSpec>,
    class_params: BTreeMap<String, ParamValue>,
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("name", &self.name)
            .field("external_params", &self.external_params)
            .field("class_params", &self.class_params)
            .finish_non_exhaustive()
    }
}

impl RegistryEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn factory(&self) -> RegularizerFactory {
        self.factory
    }

    /// Hyperparameters the caller may supply.
    pub fn external_params(&self) -> &[HyperparamSpec] {
        &self.external_params
    }

    /// Fixed parameters attached at registration.
    pub fn class_params(&self) -> &BTreeMap<String, ParamValue> {
        &self.class_params
    }

    /// Fills in declared defaults and rejects missing required hyperparameters.
    fn resolve(&self, hyperparams: &Hyperparams) -> Result<Hyperparams> {
        let mut resolved = hyperparams.clone();
        for spec in &self.external_params {
            if resolved.contains(spec.name()) {
                continue;
            }
            match spec.default_value() {
                Some(default) => resolved.set(spec.name(), default.clone())?,
                None => {
                    let err = KgeError::MissingHyperparameter {
                        regularizer: self.name.clone(),
                        name: spec.name().to_string(),
                    };
                    tracing::error!(%err, "Cannot construct regularizer");
                    return Err(err);
                }
            }
        }
        for (key, _) in hyperparams.iter() {
            if !self.external_params.iter().any(|spec| spec.name() == key) {
                tracing::debug!(
                    regularizer = %self.name,
                    hyperparam = key,
                    "Ignoring hyperparameter not declared by regularizer"
                );
            }
        }
        Ok(resolved)
    }
}

/// Name-keyed collection of regularizer entries.
#[derive(Debug, Clone, Default)]
pub struct RegularizerRegistry {
    entries: BTreeMap<String, RegistryEntry>,
}

impl RegularizerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Creates a registry holding `"None"`, `"L1"`, `"L2"` and `"L3"`.
    pub fn with_builtin() -> Self {
        fn none(p: &Hyperparams) -> Result<Box<dyn Regularizer>> {
            Ok(Box::new(NoRegularizer::from_hyperparams(p)?))
        }
        fn l1(p: &Hyperparams) -> Result<Box<dyn Regularizer>> {
            Ok(Box::new(L1Regularizer::from_hyperparams(p)?))
        }
        fn l2(p: &Hyperparams) -> Result<Box<dyn Regularizer>> {
            Ok(Box::new(L2Regularizer::from_hyperparams(p)?))
        }
        fn l3(p: &Hyperparams) -> Result<Box<dyn Regularizer>> {
            Ok(Box::new(L3Regularizer::from_hyperparams(p)?))
        }

        let lambda = || vec![HyperparamSpec::with_default(LAMBDA, DEFAULT_LAMBDA)];
        let builtin: [(&str, RegularizerFactory, Vec<HyperparamSpec>); 4] = [
            ("None", none, Vec::new()),
            ("L1", l1, lambda()),
            ("L2", l2, lambda()),
            ("L3", l3, lambda()),
        ];

        let mut registry = Self::new();
        for (name, factory, external_params) in builtin {
            registry.entries.insert(
                name.to_string(),
                RegistryEntry {
                    name: name.to_string(),
                    factory,
                    external_params,
                    class_params: BTreeMap::new(),
                },
            );
        }
        registry
    }

    /// Registers a regularizer under `name`.
    pub fn register(
        &mut self,
        name: &str,
        factory: RegularizerFactory,
        external_params: Vec<HyperparamSpec>,
        class_params: BTreeMap<String, ParamValue>,
    ) -> Result<()> {
        if self.entries.contains_key(name) {
            let err = KgeError::DuplicateRegularizer {
                name: name.to_string(),
            };
            tracing::error!(%err, "Rejected registration");
            return Err(err);
        }
        self.entries.insert(
            name.to_string(),
            RegistryEntry {
                name: name.to_string(),
                factory,
                external_params,
                class_params,
            },
        );
        Ok(())
    }

    /// Looks up an entry by name.
    pub fn entry(&self, name: &str) -> Result<&RegistryEntry> {
        self.entries.get(name).ok_or_else(|| {
            let err = KgeError::UnknownRegularizer {
                name: name.to_string(),
            };
            tracing::error!(%err, known = ?self.registered_names(), "Regularizer lookup failed");
            err
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns all registered names in sorted order.
    pub fn registered_names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Constructs the regularizer registered under `name`.
    ///
    /// Declared defaults are applied before the factory runs. With `verbose`,
    /// the name and resolved hyperparameters are logged at info level.
    pub fn build(
        &self,
        name: &str,
        hyperparams: &Hyperparams,
        verbose: bool,
    ) -> Result<Box<dyn Regularizer>> {
        let entry = self.entry(name)?;
        let resolved = entry.resolve(hyperparams)?;
        let regularizer = (entry.factory)(&resolved)?;
        if verbose {
            log_summary(regularizer.as_ref());
        }
        Ok(regularizer)
    }

    /// Returns the class-level parameter `param_name` of regularizer `name`.
    ///
    /// An unknown regularizer is an error; an unknown parameter is `None`.
    pub fn get_state(&self, name: &str, param_name: &str) -> Result<Option<&ParamValue>> {
        Ok(self.entry(name)?.class_params.get(param_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kge_core::{ErrorKind, Tensor};

    #[test]
    fn test_builtin_names() {
        let registry = RegularizerRegistry::with_builtin();
        assert_eq!(
            registry.registered_names(),
            vec!["L1".to_string(), "L2".to_string(), "L3".to_string(), "None".to_string()]
        );
        assert!(registry.contains("L2"));
        assert!(!registry.contains("l2"));
    }

    #[test]
    fn test_unknown_name_error_message() {
        let registry = RegularizerRegistry::with_builtin();
        let err = registry.entry("L4").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Regularizer L4 not found from list of known regularizers"
        );
        assert!(registry.build("L4", &Hyperparams::new(), false).is_err());
        assert!(registry.get_state("L4", "anything").is_err());
    }

    #[test]
    fn test_register_duplicate_error_message() {
        let mut registry = RegularizerRegistry::with_builtin();
        fn factory(_: &Hyperparams) -> Result<Box<dyn Regularizer>> {
            Ok(Box::new(NoRegularizer::new()))
        }
        let err = registry
            .register("L1", factory, Vec::new(), BTreeMap::new())
            .unwrap_err();
        assert_eq!(err.to_string(), "Duplicate regularizer registered for key L1");
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_builtin_external_params() {
        let registry = RegularizerRegistry::with_builtin();
        assert!(registry.entry("None").unwrap().external_params().is_empty());

        let l3 = registry.entry("L3").unwrap();
        assert_eq!(l3.name(), "L3");
        assert_eq!(l3.external_params().len(), 1);
        assert_eq!(l3.external_params()[0].name(), "lambda");
        assert_eq!(
            l3.external_params()[0].default_value(),
            Some(&ParamValue::Float(1e-5))
        );
    }

    #[test]
    fn test_required_param_missing() {
        let mut registry = RegularizerRegistry::new();
        fn factory(p: &Hyperparams) -> Result<Box<dyn Regularizer>> {
            Ok(Box::new(L2Regularizer::from_hyperparams(p)?))
        }
        registry
            .register(
                "StrictL2",
                factory,
                vec![HyperparamSpec::required("lambda")],
                BTreeMap::new(),
            )
            .unwrap();

        let err = registry
            .build("StrictL2", &Hyperparams::new(), false)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(matches!(err, KgeError::MissingHyperparameter { .. }));

        let params = Hyperparams::new().with("lambda", 0.5).unwrap();
        let mut reg = registry.build("StrictL2", &params, false).unwrap();
        let loss = reg.apply(&[Tensor::from_vec(vec![2.0])]).unwrap();
        assert_eq!(loss, 2.0);
    }

    #[test]
    fn test_get_state() {
        let mut registry = RegularizerRegistry::new();
        let mut class_params = BTreeMap::new();
        class_params.insert("sparse".to_string(), ParamValue::Bool(true));
        fn factory(_: &Hyperparams) -> Result<Box<dyn Regularizer>> {
            Ok(Box::new(NoRegularizer::new()))
        }
        registry
            .register("Custom", factory, Vec::new(), class_params)
            .unwrap();

        assert_eq!(
            registry.get_state("Custom", "sparse").unwrap(),
            Some(&ParamValue::Bool(true))
        );
        assert_eq!(registry.get_state("Custom", "missing").unwrap(), None);
    }

    #[test]
    fn test_instances_are_independent() {
        let registry = RegularizerRegistry::with_builtin();
        let params = Hyperparams::new().with("lambda", 1.0).unwrap();
        let mut a = registry.build("L1", &params, false).unwrap();
        let mut b = registry.build("L1", &params, false).unwrap();

        a.apply(&[Tensor::ones(&[2]), Tensor::ones(&[2])]).unwrap();
        // `b` never saw two tensors, so its scalar weight still broadcasts to one.
        assert_eq!(b.apply(&[Tensor::ones(&[3])]).unwrap(), 3.0);
        assert!(a.apply(&[Tensor::ones(&[3])]).is_err());
    }
}
