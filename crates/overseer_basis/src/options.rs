//! Option application for Basis/Project construction (`# 4.E` step 1, `# 9`'s
//! "option functions become named transformations applied in order, each
//! returning an aggregated error").

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use overseer_system::{AggregateError, Context, FactoryRegistry, FlagMapper, PersistenceClient, Ui, append};

use crate::error::OptionError;

/// Translates a plugin's declared inputs into a wire-ready key/value map.
/// The Basis seeds the mapper list with [`ProtoMapper`] plus [`CliArgsMapper`]
/// when the caller supplies none (`# 4.E` step 5).
pub trait ArgMapper: Send + Sync {
    /// A stable name, used only for duplicate detection at option time.
    fn name(&self) -> &str;

    /// Maps `words` into a flat key/value table.
    fn map(&self, words: &[String]) -> HashMap<String, String>;
}

/// The built-in mapper translating proto-shaped flags (`--key=value`) into
/// a key/value map.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProtoMapper;

impl ArgMapper for ProtoMapper {
    fn name(&self) -> &str {
        "proto"
    }

    fn map(&self, words: &[String]) -> HashMap<String, String> {
        words
            .iter()
            .filter_map(|w| w.strip_prefix("--"))
            .filter_map(|kv| kv.split_once('='))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

/// The extra mapper `# 4.E` step 5 calls for: translates bare CLI
/// positional args into a key/value map keyed by position index.
#[derive(Debug, Default, Clone, Copy)]
pub struct CliArgsMapper;

impl ArgMapper for CliArgsMapper {
    fn name(&self) -> &str {
        "cli_args"
    }

    fn map(&self, words: &[String]) -> HashMap<String, String> {
        words
            .iter()
            .enumerate()
            .filter(|(_, w)| !w.starts_with("--"))
            .map(|(i, w)| (i.to_string(), w.clone()))
            .collect()
    }
}

/// Raw construction options for a [`crate::basis::Basis`], applied in
/// `# 4.E`'s construction order.
#[derive(Default)]
pub struct BasisOptions {
    /// Human-assigned name.
    pub name: Option<String>,
    /// Known resource id, if the Basis record already exists server-side.
    pub resource_id: Option<String>,
    /// Data directory.
    pub data_dir: Option<PathBuf>,
    /// UI handle; defaults to `ConsoleUi` if absent.
    pub ui: Option<Arc<dyn Ui>>,
    /// Persistence client; required (missing is a fatal, `# 4.E` step 3).
    pub client: Option<Arc<dyn PersistenceClient>>,
    /// Factory registry; required (missing is a fatal, `# 4.E` step 3).
    pub factories: Option<Arc<FactoryRegistry>>,
    /// Arg mappers; defaulted if empty (`# 4.E` step 5).
    pub mappers: Option<Vec<Arc<dyn ArgMapper>>>,
    /// Config file path; a load failure recovers to `Config::default()`.
    pub config_path: Option<PathBuf>,
    /// Outbound context; defaults to a fresh [`Context`] if absent.
    pub context: Option<Context>,
    /// Whether to derive the `::trace` logger namespace (`# 4.E` step 2).
    pub trace_root: bool,
    /// Flag-to-wire mapper applied during `init()`'s flattening (`# 6`);
    /// defaults to [`overseer_system::IdentityFlagMapper`] if absent.
    pub flag_mapper: Option<Arc<dyn FlagMapper>>,
}

/// Raw construction options for a [`crate::project::Project`].
#[derive(Default)]
pub struct ProjectOptions {
    /// Human-assigned name.
    pub name: Option<String>,
    /// Known resource id.
    pub resource_id: Option<String>,
    /// Data directory; defaults to the parent Basis's if unset.
    pub data_dir: Option<PathBuf>,
}

fn validate_name(name: &Option<String>) -> Result<(), OptionError> {
    match name {
        Some(n) if n.trim().is_empty() => Err(OptionError::EmptyName),
        None => Err(OptionError::EmptyName),
        Some(_) => Ok(()),
    }
}

fn validate_mappers(mappers: &Option<Vec<Arc<dyn ArgMapper>>>) -> Result<(), OptionError> {
    let Some(mappers) = mappers else {
        return Ok(());
    };
    let mut seen = std::collections::HashSet::new();
    for mapper in mappers {
        if !seen.insert(mapper.name().to_string()) {
            return Err(OptionError::DuplicateMapper(mapper.name().to_string()));
        }
    }
    Ok(())
}

/// Runs every named validator over `options`, aggregating every failure
/// rather than stopping at the first (`# 4.E` step 1, `# 7`).
pub fn validate_basis_options(options: &BasisOptions) -> Result<(), AggregateError> {
    let mut agg: Option<AggregateError> = None;
    agg = append(agg, validate_name(&options.name).err());
    agg = append(agg, validate_mappers(&options.mappers).err());
    agg.map_or(Ok(()), Err)
}

/// Runs every named validator over `options`.
pub fn validate_project_options(options: &ProjectOptions) -> Result<(), AggregateError> {
    let mut agg: Option<AggregateError> = None;
    agg = append(agg, validate_name(&options.name).err());
    agg.map_or(Ok(()), Err)
}

/// Returns the default mapper list (`# 4.E` step 5).
#[must_use]
pub fn default_mappers() -> Vec<Arc<dyn ArgMapper>> {
    vec![Arc::new(ProtoMapper), Arc::new(CliArgsMapper)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_name_and_duplicate_mapper_both_reported() {
        struct DupMapper;
        impl ArgMapper for DupMapper {
            fn name(&self) -> &str {
                "proto"
            }
            fn map(&self, _words: &[String]) -> HashMap<String, String> {
                HashMap::new()
            }
        }

        let options = BasisOptions {
            name: None,
            mappers: Some(vec![Arc::new(ProtoMapper), Arc::new(DupMapper)]),
            ..Default::default()
        };
        let err = validate_basis_options(&options).unwrap_err();
        assert_eq!(err.len(), 2);
    }

    #[test]
    fn valid_options_pass() {
        let options = BasisOptions {
            name: Some("demo".to_string()),
            ..Default::default()
        };
        assert!(validate_basis_options(&options).is_ok());
    }

    #[test]
    fn proto_mapper_parses_flag_pairs() {
        let words = vec!["--region=us-east".to_string(), "plain".to_string()];
        let map = ProtoMapper.map(&words);
        assert_eq!(map.get("region"), Some(&"us-east".to_string()));
    }

    #[test]
    fn cli_args_mapper_keys_by_position() {
        let words = vec!["first".to_string(), "--flag=x".to_string(), "third".to_string()];
        let map = CliArgsMapper.map(&words);
        assert_eq!(map.get("0"), Some(&"first".to_string()));
        assert_eq!(map.get("2"), Some(&"third".to_string()));
        assert!(!map.contains_key("1"));
    }
}
