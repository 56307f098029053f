//! Plugin instances, specialization, and the Command/Host capability traits.
//!
//! The source system dispatches to plugins by reflective method lookup on
//! arbitrary values (`# 9 DESIGN NOTES`). Rust has no such reflection, so the
//! capability set is made explicit: [`PluginValue`] exposes optional
//! capability accessors that default to `None`, and concrete plugin types
//! override the ones they support — the same shape as an erased provider
//! that can be asked "do you also do X?" without a downcast.

use std::error::Error as StdError;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

/// A flag a command plugin declares alongside a subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFlag {
    /// Flag name as it appears on the wire (mapper-translated upstream).
    pub name: String,
    /// One-line help text.
    pub help: String,
}

/// A node in the command tree a [`CommandPlugin`] returns from
/// [`CommandPlugin::command_info`]; children are nested subcommands.
///
/// `init()` flattens a tree of these into whitespace-joined flat records
/// (`# 4.E`'s `init()` step).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandNode {
    /// This node's own name (not yet joined with any parent).
    pub name: String,
    /// One-line synopsis.
    pub synopsis: String,
    /// Full help text.
    pub help: String,
    /// Flags recognized at this node.
    pub flags: Vec<CommandFlag>,
    /// Nested subcommands.
    pub children: Vec<CommandNode>,
}

/// A flattened command record produced by [`flatten`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRecord {
    /// Whitespace-joined path from the root command to this node.
    pub name: String,
    /// This node's synopsis.
    pub synopsis: String,
    /// This node's help text.
    pub help: String,
    /// This node's flags.
    pub flags: Vec<CommandFlag>,
}

/// Translates a single flag into its wire form (`# 6`: "flags are translated
/// through a pluggable mapper to the wire form"). [`IdentityFlagMapper`] is
/// the default when a caller supplies none.
pub trait FlagMapper: Send + Sync {
    /// Returns the wire-form translation of `flag`.
    fn map_flag(&self, flag: &CommandFlag) -> CommandFlag;
}

/// The no-op [`FlagMapper`]: flags pass through unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityFlagMapper;

impl FlagMapper for IdentityFlagMapper {
    fn map_flag(&self, flag: &CommandFlag) -> CommandFlag {
        flag.clone()
    }
}

/// Flattens a command tree into the sequence `init()` returns, joining
/// parent and child names with a single space, with flags passed through
/// [`IdentityFlagMapper`].
#[must_use]
pub fn flatten(root: &CommandNode) -> Vec<CommandRecord> {
    flatten_with(root, &IdentityFlagMapper)
}

/// Like [`flatten`], translating every flag through `mapper` on the way to
/// the wire form.
#[must_use]
pub fn flatten_with(root: &CommandNode, mapper: &dyn FlagMapper) -> Vec<CommandRecord> {
    let mut out = Vec::new();
    flatten_into(root, None, mapper, &mut out);
    out
}

fn flatten_into(node: &CommandNode, parent: Option<&str>, mapper: &dyn FlagMapper, out: &mut Vec<CommandRecord>) {
    let name = match parent {
        Some(parent) => format!("{parent} {}", node.name),
        None => node.name.clone(),
    };
    out.push(CommandRecord {
        name: name.clone(),
        synopsis: node.synopsis.clone(),
        help: node.help.clone(),
        flags: node.flags.iter().map(|flag| mapper.map_flag(flag)).collect(),
    });
    for child in &node.children {
        flatten_into(child, Some(&name), mapper, out);
    }
}

/// Capability: can report a command tree and execute a command line.
#[async_trait]
pub trait CommandPlugin: PluginValue {
    /// Returns the command tree rooted at this plugin.
    fn command_info(&self) -> CommandNode;

    /// Executes the command with the given words; `0` is success, any other
    /// value (or an error) is task failure per `# 4.E`'s dispatch rule.
    async fn execute(&self, words: &[String]) -> Result<i64, Box<dyn StdError + Send + Sync>>;
}

/// Capability: can detect whether its target host environment is active.
#[async_trait]
pub trait HostPlugin: PluginValue {
    /// Returns whether this host is detected as the current environment.
    async fn detect(&self) -> bool;
}

/// Capability: can have request-scoped string metadata stamped onto it
/// before dispatch ("specialization", `# 4.C`).
pub trait Specializable: PluginValue {
    /// Stamps a single key/value pair.
    fn set_request_metadata(&self, key: &str, value: &str);
}

/// The value half of a [`PluginInstance`]: satisfies zero or more optional
/// capabilities, each surfaced as an `Option<&dyn Trait>` accessor that
/// defaults to `None`.
pub trait PluginValue: Send + Sync {
    /// Returns this value as a [`CommandPlugin`] if it implements the
    /// capability.
    fn as_command(&self) -> Option<&dyn CommandPlugin> {
        None
    }

    /// Returns this value as a [`HostPlugin`] if it implements the
    /// capability.
    fn as_host(&self) -> Option<&dyn HostPlugin> {
        None
    }

    /// Returns this value as a [`Specializable`] if it implements the
    /// capability.
    fn as_specializable(&self) -> Option<&dyn Specializable> {
        None
    }
}

type CloseHook = Box<dyn FnOnce() -> Result<(), Box<dyn StdError + Send + Sync>> + Send>;

/// A constructed plugin value plus its close hook (`# 3`'s PluginInstance
/// triple; the metadata setter lives on the value itself via
/// [`PluginValue::as_specializable`]).
///
/// Has exactly one owner: it is not `Clone`. Callers of factory lookups get
/// borrowed references, never ownership transfer, matching `# 3`'s
/// invariant.
pub struct PluginInstance {
    value: Arc<dyn PluginValue>,
    close: Mutex<Option<CloseHook>>,
}

impl PluginInstance {
    /// Wraps `value` with no close action.
    pub fn new(value: impl PluginValue + 'static) -> Self {
        Self {
            value: Arc::new(value),
            close: Mutex::new(None),
        }
    }

    /// Wraps `value` with a close hook run (at most once) by [`Self::close`].
    pub fn with_close(
        value: impl PluginValue + 'static,
        hook: impl FnOnce() -> Result<(), Box<dyn StdError + Send + Sync>> + Send + 'static,
    ) -> Self {
        Self {
            value: Arc::new(value),
            close: Mutex::new(Some(Box::new(hook))),
        }
    }

    /// Borrows the underlying value.
    #[must_use]
    pub fn value(&self) -> &dyn PluginValue {
        self.value.as_ref()
    }

    /// Runs the close hook if it has not already run. Idempotent: a second
    /// call is a no-op returning `Ok(())`.
    pub fn close(&self) -> Result<(), Box<dyn StdError + Send + Sync>> {
        if let Some(hook) = self.close.lock().take() {
            hook()?;
        }
        Ok(())
    }
}

/// Stamps the default request metadata onto `instance`'s value if it is
/// specializable; fails with [`crate::error::NotSpecializable`] otherwise.
///
/// At minimum stamps `basis_resource_id` and `vagrant_service_endpoint` per
/// `# 4.C`.
pub fn specialize(
    instance: &PluginInstance,
    basis_resource_id: &str,
    service_endpoint: &str,
) -> Result<(), crate::error::NotSpecializable> {
    let Some(target) = instance.value().as_specializable() else {
        return Err(crate::error::NotSpecializable);
    };
    target.set_request_metadata("basis_resource_id", basis_resource_id);
    target.set_request_metadata("vagrant_service_endpoint", service_endpoint);
    Ok(())
}

/// Normalizes a command-kind name to its root token (everything before the
/// first whitespace), per `# 4.C`'s factory-lookup normalization rule.
#[must_use]
pub fn normalize_command_name(name: &str) -> &str {
    name.split_whitespace().next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct PlainValue;
    impl PluginValue for PlainValue {}

    struct SpecializableValue {
        stamped: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl PluginValue for SpecializableValue {
        fn as_specializable(&self) -> Option<&dyn Specializable> {
            Some(self)
        }
    }

    impl Specializable for SpecializableValue {
        fn set_request_metadata(&self, key: &str, value: &str) {
            self.stamped
                .lock()
                .push((key.to_string(), value.to_string()));
        }
    }

    #[test]
    fn plain_value_has_no_capabilities() {
        let inst = PluginInstance::new(PlainValue);
        assert!(inst.value().as_command().is_none());
        assert!(inst.value().as_host().is_none());
        assert!(inst.value().as_specializable().is_none());
    }

    #[test]
    fn specialize_stamps_required_keys() {
        let stamped = Arc::new(Mutex::new(Vec::new()));
        let value = SpecializableValue {
            stamped: stamped.clone(),
        };
        let inst = PluginInstance::new(value);
        specialize(&inst, "basis-1", "https://endpoint").unwrap();

        let recorded = stamped.lock();
        assert!(recorded.contains(&("basis_resource_id".to_string(), "basis-1".to_string())));
        assert!(recorded.contains(&("vagrant_service_endpoint".to_string(), "https://endpoint".to_string())));
    }

    #[test]
    fn specialize_non_specializable_fails() {
        let inst = PluginInstance::new(PlainValue);
        assert!(specialize(&inst, "basis-1", "https://endpoint").is_err());
    }

    #[test]
    fn close_runs_exactly_once() {
        let ran = Arc::new(AtomicBool::new(false));
        let ran_clone = ran.clone();
        let inst = PluginInstance::with_close(PlainValue, move || {
            assert!(!ran_clone.swap(true, Ordering::SeqCst), "already closed");
            Ok(())
        });
        inst.close().unwrap();
        inst.close().unwrap();
        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn flatten_joins_parent_and_child_names() {
        let root = CommandNode {
            name: "foo".into(),
            children: vec![CommandNode {
                name: "bar".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let records = flatten(&root);
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["foo", "foo bar"]);
    }

    #[test]
    fn flatten_with_applies_mapper_to_every_node() {
        struct UppercaseFlagMapper;
        impl FlagMapper for UppercaseFlagMapper {
            fn map_flag(&self, flag: &CommandFlag) -> CommandFlag {
                CommandFlag {
                    name: flag.name.to_uppercase(),
                    help: flag.help.clone(),
                }
            }
        }

        let root = CommandNode {
            name: "foo".into(),
            flags: vec![CommandFlag {
                name: "loud".into(),
                help: "shout".into(),
            }],
            children: vec![CommandNode {
                name: "bar".into(),
                flags: vec![CommandFlag {
                    name: "quiet".into(),
                    help: "whisper".into(),
                }],
                ..Default::default()
            }],
            ..Default::default()
        };

        let records = flatten_with(&root, &UppercaseFlagMapper);
        assert_eq!(records[0].flags[0].name, "LOUD");
        assert_eq!(records[1].flags[0].name, "QUIET");
    }

    #[test]
    fn normalize_strips_subcommand_suffix() {
        assert_eq!(normalize_command_name("foo bar"), "foo");
        assert_eq!(normalize_command_name("foo"), "foo");
    }
}
