//! Mojo Registry

use crate::{bind, MetaField, Mojo, MojoDescriptor, MojoInstance, ParamOptions, HostContext};
use mojo_core::{AdapterError, ParamKind};
use serde_json::{json, Value};
use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Identity of a mojo type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PluginType {
    id: TypeId,
    name: &'static str,
}

impl PluginType {
    pub fn of<T: 'static>() -> Self {
        Self { id: TypeId::of::<T>(), name: std::any::type_name::<T>() }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

type Factory = Arc<dyn Fn() -> Box<dyn Mojo> + Send + Sync>;

struct Entry {
    descriptor: Arc<MojoDescriptor>,
    factory: Option<Factory>,
}

/// Central mojo registry
#[derive(Default)]
pub struct MojoRegistry {
    entries: HashMap<PluginType, Entry>,
    goals: HashMap<String, PluginType>,
    order: Vec<PluginType>,
}

impl MojoRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mojo type: run its declarations and keep a factory for it
    pub fn with_mojo<M: Mojo + Default + 'static>(mut self) -> Self {
        self.register::<M>();
        self
    }

    /// A type registers once; repeats are ignored. A type whose goal is
    /// already owned by another type is rejected and leaves no entry behind.
    pub fn register<M: Mojo + Default + 'static>(&mut self) {
        let key = PluginType::of::<M>();
        let existed = match self.entries.get(&key) {
            Some(entry) if entry.factory.is_some() => {
                tracing::debug!(mojo = key.name(), "mojo already registered");
                return;
            }
            Some(_) => true,
            None => false,
        };

        let mut decl = Declarer { registry: self, key, rejected: false };
        M::declare(&mut decl);
        let rejected = decl.rejected;
        if rejected && !existed {
            self.entries.remove(&key);
            self.order.retain(|k| *k != key);
            tracing::warn!(mojo = key.name(), "mojo not registered: goal already taken");
            return;
        }

        let factory: Factory = Arc::new(|| Box::new(M::default()) as Box<dyn Mojo>);
        self.entry(key).factory = Some(factory);
        tracing::debug!(mojo = key.name(), "registered mojo");
    }

    fn entry(&mut self, key: PluginType) -> &mut Entry {
        if !self.entries.contains_key(&key) {
            self.order.push(key);
        }
        self.entries.entry(key).or_insert_with(|| Entry {
            descriptor: Arc::new(MojoDescriptor::default()),
            factory: None,
        })
    }

    /// Record one scalar metadata field. Last write wins, except that a goal
    /// owned by another type is left with its first owner.
    pub fn declare(&mut self, key: PluginType, field: MetaField, value: impl Into<String>) {
        if field == MetaField::Goal {
            self.declare_goal(key, value.into());
            return;
        }
        Arc::make_mut(&mut self.entry(key).descriptor).set(field, value.into());
    }

    /// Returns false when the goal belongs to a different type
    fn declare_goal(&mut self, key: PluginType, goal: String) -> bool {
        if let Some(owner) = self.goals.get(&goal).filter(|owner| **owner != key) {
            tracing::warn!(goal = %goal, owner = owner.name(), mojo = key.name(), "goal already declared");
            return false;
        }

        let entry = self.entry(key);
        let old_goal = std::mem::replace(&mut Arc::make_mut(&mut entry.descriptor).goal, goal.clone());
        if self.goals.get(&old_goal) == Some(&key) {
            self.goals.remove(&old_goal);
        }
        self.goals.insert(goal, key);
        true
    }

    /// Append a parameter declaration, preserving order
    pub fn declare_parameter(&mut self, key: PluginType, kind: ParamKind, name: impl Into<String>, options: ParamOptions) {
        let spec = options.into_spec(kind, name);
        Arc::make_mut(&mut self.entry(key).descriptor).parameters.push(spec);
    }

    pub fn get_descriptor(&self, key: PluginType) -> Result<Arc<MojoDescriptor>, AdapterError> {
        self.entries
            .get(&key)
            .map(|e| e.descriptor.clone())
            .ok_or_else(|| AdapterError::unknown(key.name()))
    }

    pub fn descriptor_of<M: 'static>(&self) -> Result<Arc<MojoDescriptor>, AdapterError> {
        self.get_descriptor(PluginType::of::<M>())
    }

    pub fn find_goal(&self, goal: &str) -> Result<Arc<MojoDescriptor>, AdapterError> {
        self.goal_entry(goal).map(|e| e.descriptor.clone())
    }

    fn goal_entry(&self, goal: &str) -> Result<&Entry, AdapterError> {
        self.goals
            .get(goal)
            .and_then(|key| self.entries.get(key))
            .ok_or_else(|| AdapterError::UnknownPluginType {
                name: goal.to_string(),
                similar: self.find_similar_goals(goal).into_iter().take(5).collect(),
            })
    }

    /// Build a bound instance of a registered goal
    pub fn instantiate(&self, goal: &str, host: &HostContext) -> Result<MojoInstance, AdapterError> {
        let entry = self.goal_entry(goal)?;
        let factory = entry.factory.as_ref().ok_or_else(|| AdapterError::unknown(goal))?;
        let params = bind(&entry.descriptor, host)?;
        Ok(MojoInstance::new(entry.descriptor.clone(), params, factory()))
    }

    /// Build a bound instance of `M` directly
    pub fn instantiate_type<M: Mojo + Default + 'static>(&self, host: &HostContext) -> Result<MojoInstance, AdapterError> {
        let descriptor = self.descriptor_of::<M>()?;
        let params = bind(&descriptor, host)?;
        Ok(MojoInstance::new(descriptor, params, Box::new(M::default())))
    }

    /// Descriptors in registration order
    pub fn descriptors(&self) -> Vec<Arc<MojoDescriptor>> {
        self.order
            .iter()
            .filter_map(|key| self.entries.get(key))
            .map(|e| e.descriptor.clone())
            .collect()
    }

    /// Goal names similar to the given name (for error suggestions)
    fn find_similar_goals(&self, name: &str) -> Vec<String> {
        let name_lower = name.to_lowercase();
        let mut matches: Vec<(String, usize)> = self.goals.keys()
            .filter_map(|goal| {
                let score = Self::similarity_score(&name_lower, &goal.to_lowercase());
                if score > 0 {
                    Some((goal.clone(), score))
                } else {
                    None
                }
            })
            .collect();

        matches.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        matches.into_iter().map(|(name, _)| name).collect()
    }

    fn similarity_score(query: &str, candidate: &str) -> usize {
        let mut score = 0;

        if candidate.starts_with(query) {
            score += 100;
        } else if candidate.contains(query) {
            score += 50;
        } else if query.contains(candidate) {
            score += 30;
        }

        // Shared characters
        let query_chars: HashSet<char> = query.chars().collect();
        let candidate_chars: HashSet<char> = candidate.chars().collect();
        let common = query_chars.intersection(&candidate_chars).count();
        score += common * 2;

        let len_diff = query.len().abs_diff(candidate.len());
        if len_diff < 5 && score > 0 {
            score += 5 - len_diff;
        }

        score
    }

    pub fn help(&self, goal: Option<&str>) -> Value {
        match goal {
            Some(g) => self.help_for(g),
            None => self.general_help(),
        }
    }

    fn help_for(&self, goal: &str) -> Value {
        match self.find_goal(goal) {
            Ok(d) => json!({
                "goal": d.goal,
                "phase": d.phase,
                "description": d.description,
                "requiresDependencyResolution": d.requires_dependency_resolution,
                "parameters": d.parameters,
            }),
            Err(e) => json!({ "error": mojo_core::MojoError::from(e) }),
        }
    }

    fn general_help(&self) -> Value {
        let mut by_phase: HashMap<String, Vec<String>> = HashMap::new();
        for d in self.descriptors() {
            by_phase.entry(d.phase.clone()).or_default().push(d.goal.clone());
        }
        json!({
            "goals": by_phase,
            "usage": "Call help('goal') for detailed help.",
        })
    }

    pub fn list_goals(&self) -> Value {
        Value::Array(
            self.descriptors()
                .iter()
                .map(|d| json!({ "goal": d.goal, "phase": d.phase, "description": d.description }))
                .collect(),
        )
    }
}

/// Declaration surface handed to `Mojo::declare`
pub struct Declarer<'a> {
    registry: &'a mut MojoRegistry,
    key: PluginType,
    rejected: bool,
}

impl Declarer<'_> {
    pub fn goal(&mut self, value: impl Into<String>) -> &mut Self {
        if !self.registry.declare_goal(self.key, value.into()) {
            self.rejected = true;
        }
        self
    }

    pub fn phase(&mut self, value: impl Into<String>) -> &mut Self {
        self.registry.declare(self.key, MetaField::Phase, value);
        self
    }

    pub fn description(&mut self, value: impl Into<String>) -> &mut Self {
        self.registry.declare(self.key, MetaField::Description, value);
        self
    }

    pub fn requires_dependency_resolution(&mut self, scope: impl Into<String>) -> &mut Self {
        self.registry.declare(self.key, MetaField::RequiresDependencyResolution, scope);
        self
    }

    pub fn parameter(&mut self, kind: ParamKind, name: impl Into<String>, options: ParamOptions) -> &mut Self {
        self.registry.declare_parameter(self.key, kind, name, options);
        self
    }

    pub fn string(&mut self, name: impl Into<String>, options: ParamOptions) -> &mut Self {
        self.parameter(ParamKind::String, name, options)
    }

    pub fn date(&mut self, name: impl Into<String>, options: ParamOptions) -> &mut Self {
        self.parameter(ParamKind::Date, name, options)
    }

    pub fn file(&mut self, name: impl Into<String>, options: ParamOptions) -> &mut Self {
        self.parameter(ParamKind::File, name, options)
    }
}
