use crate::expression::compiler::{CompileEnv, ExprCompiler, compile_property_value};
use crate::expression::interp::{ClosureEmitter, EvalFault, Thunk};
use crate::expression::types::ExprType;
use crate::expression::value::Value;
use crate::foundation::core::{InterpretedPlatform, Size};
use crate::foundation::error::{WidgetError, WidgetResult};
use crate::foundation::path::JsonPath;
use crate::layout::binding::Segment;
use crate::layout::model::{ElementKind, LayoutElement, Prop, PropertyValue, WidgetLayout};
use crate::render::backend::{NodeId, ViewBackend, ViewTree};
use crate::render::context::{DataContext, DataPath, DataRoot};
use crate::render::dialect::{Dialect, Encoding, Flow, SpacingTarget};
use crate::style::color::DIVIDER_COLOR;
use crate::style::config::{Axis, StyleConfig};
use crate::style::modifiers::{ModValue, ModifierChain, StyleAttr, build_modifiers};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Interprets layouts into a retained view tree for one platform.
#[derive(Clone, Debug)]
pub struct Renderer {
    dialect: Dialect,
    config: Arc<StyleConfig>,
}

/// Counters of one [`Renderer::update`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateStats {
    /// Paths that differ between the previous and the new context.
    pub changed_paths: usize,
    /// Bound properties re-evaluated because a dependency changed.
    pub evaluated: usize,
    /// Backend property writes (sets and removals).
    pub writes: usize,
    /// `forEach` / `conditional` nodes whose children were rebuilt.
    pub rebuilt: usize,
}

/// A rendered widget: the backend plus what is needed to update it in place.
#[derive(Debug)]
pub struct ViewHandle<B: ViewBackend> {
    backend: B,
    layout: Arc<WidgetLayout>,
    size: Size,
    root: NodeId,
    scope: Scope,
    context: DataContext,
}

impl<B: ViewBackend> ViewHandle<B> {
    /// The backend holding the views.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Layout this handle renders.
    pub fn layout(&self) -> &Arc<WidgetLayout> {
        &self.layout
    }

    /// Canvas size `size.*` bindings were folded to.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Context of the last render or update.
    pub fn context(&self) -> &DataContext {
        &self.context
    }

    /// Number of properties that may change on update.
    pub fn bound_properties(&self) -> usize {
        self.scope.bound_properties()
    }

    /// Bindings the current context leaves unresolved, each recovered by its fallback.
    ///
    /// One [`WidgetError::MissingBinding`] per distinct binding, sorted; empty once the data is
    /// complete.
    pub fn missing_bindings(&self) -> Vec<WidgetError> {
        let mut missing = BTreeSet::new();
        self.scope.collect_missing(&self.context, &mut missing);
        missing.into_iter().map(WidgetError::missing_binding).collect()
    }

    /// Give up the handle, keeping the views.
    pub fn into_backend(self) -> B {
        self.backend
    }
}

/// Bound properties and structural slots of one subtree.
#[derive(Debug, Default)]
struct Scope {
    bindings: Vec<BoundProperty>,
    slots: Vec<Slot>,
}

impl Scope {
    fn bound_properties(&self) -> usize {
        self.bindings.len()
            + self
                .slots
                .iter()
                .map(|s| s.scope.bound_properties())
                .sum::<usize>()
    }

    fn collect_missing(&self, ctx: &DataContext, out: &mut BTreeSet<String>) {
        let conditions = self.slots.iter().filter_map(|s| match &s.kind {
            SlotKind::Conditional { condition } => Some(condition),
            SlotKind::ForEach { spacing, .. } => spacing.as_ref(),
        });
        for thunk in self.bindings.iter().map(|b| &b.thunk).chain(conditions) {
            if let Err(EvalFault::Missing(binding)) = thunk.eval(ctx) {
                out.insert(binding);
            }
        }
        for slot in &self.slots {
            slot.scope.collect_missing(ctx, out);
        }
    }
}

/// A data-dependent property and the native value last written for it.
#[derive(Debug)]
struct BoundProperty {
    targets: Vec<NodeId>,
    names: Vec<&'static str>,
    encoding: Encoding,
    thunk: Thunk,
    last: Option<String>,
}

#[derive(Debug)]
enum SlotKind {
    ForEach {
        items: Option<DataPath>,
        limit: Option<usize>,
        spacing: Option<Thunk>,
    },
    Conditional {
        condition: Thunk,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SlotKey {
    Count(usize),
    Branch(bool),
}

/// A node whose children depend on data; rebuilt when its key changes.
#[derive(Debug)]
struct Slot {
    node: NodeId,
    /// Child indices from the layout root to the element.
    element: Vec<usize>,
    prefix: Vec<Segment>,
    flow: Flow,
    inherited: Vec<(&'static str, String)>,
    kind: SlotKind,
    key: SlotKey,
    scope: Scope,
}

impl Slot {
    fn key_deps(&self) -> &[DataPath] {
        match &self.kind {
            SlotKind::ForEach { items: Some(p), .. } => std::slice::from_ref(p),
            SlotKind::ForEach { items: None, .. } => &[],
            SlotKind::Conditional { condition } => condition.deps(),
        }
    }
}

fn touches(deps: &[DataPath], changed: &[DataPath]) -> bool {
    deps.iter().any(|d| changed.iter().any(|c| c.overlaps(d)))
}

impl Renderer {
    /// Renderer for `platform` using `config` for palettes and native constants.
    pub fn new(platform: InterpretedPlatform, config: Arc<StyleConfig>) -> Self {
        Self {
            dialect: Dialect::new(platform),
            config,
        }
    }

    /// Target platform.
    pub fn platform(&self) -> InterpretedPlatform {
        self.dialect.interpreted()
    }

    /// Render into a fresh in-memory [`ViewTree`].
    pub fn render(
        &self,
        layout: impl Into<Arc<WidgetLayout>>,
        ctx: &DataContext,
        size: Size,
    ) -> WidgetResult<ViewHandle<ViewTree>> {
        self.render_into(ViewTree::new(), layout, ctx, size)
    }

    /// Render into `backend`.
    ///
    /// Every property is compiled to a closure and evaluated once; those that read data are
    /// kept on the handle for [`Renderer::update`].
    #[tracing::instrument(skip_all, fields(platform = %self.dialect.platform()))]
    pub fn render_into<B: ViewBackend>(
        &self,
        mut backend: B,
        layout: impl Into<Arc<WidgetLayout>>,
        ctx: &DataContext,
        size: Size,
    ) -> WidgetResult<ViewHandle<B>> {
        let layout = layout.into();
        let mut scope = Scope::default();
        let mut build = Build {
            dialect: self.dialect,
            config: &self.config,
            backend: &mut backend,
            ctx,
            size,
            stats: UpdateStats::default(),
        };
        let root = build
            .element(&layout.layout, &mut Vec::new(), &[], Flow::Overlay, &[], &mut scope)
            .map_err(|e| e.in_widget(layout.name.clone()))?;
        if let Some(p) = layout.root_default_padding() {
            let (names, enc) = self.dialect.style_outputs(StyleAttr::Padding, layout.layout.kind);
            if let Some(v) = self.dialect.encode(enc, &Value::Number(p), &self.config) {
                for n in names {
                    build.set(root, n, &v);
                }
            }
        }
        tracing::debug!(
            widget = %layout.name,
            bound = scope.bound_properties(),
            "rendered"
        );
        Ok(ViewHandle {
            backend,
            layout,
            size,
            root,
            scope,
            context: ctx.clone(),
        })
    }

    /// Bring a rendered handle up to date with `ctx`.
    ///
    /// Only properties whose dependencies intersect the changed paths are re-evaluated, and
    /// the backend is written only when the native value differs. `forEach` and
    /// `conditional` children are rebuilt only when the item count or branch changes.
    #[tracing::instrument(skip_all, fields(widget = %handle.layout.name))]
    pub fn update<B: ViewBackend>(
        &self,
        handle: &mut ViewHandle<B>,
        ctx: &DataContext,
    ) -> WidgetResult<UpdateStats> {
        let changed = handle.context.diff(ctx);
        let ViewHandle {
            backend,
            layout,
            size,
            scope,
            ..
        } = handle;
        let mut build = Build {
            dialect: self.dialect,
            config: &self.config,
            backend,
            ctx,
            size: *size,
            stats: UpdateStats {
                changed_paths: changed.len(),
                ..UpdateStats::default()
            },
        };
        if !changed.is_empty() {
            build
                .refresh(scope, &changed, &layout.layout)
                .map_err(|e| e.in_widget(layout.name.clone()))?;
        }
        let stats = build.stats;
        handle.context = ctx.clone();
        tracing::debug!(?stats, "update applied");
        Ok(stats)
    }
}

struct Build<'a, B: ViewBackend> {
    dialect: Dialect,
    config: &'a StyleConfig,
    backend: &'a mut B,
    ctx: &'a DataContext,
    size: Size,
    stats: UpdateStats,
}

impl<'a, B: ViewBackend> Build<'a, B> {
    fn env(&self) -> CompileEnv<'a> {
        CompileEnv {
            config: self.config,
            platform: self.dialect.platform(),
            size: self.size,
        }
    }

    fn set(&mut self, node: NodeId, name: &str, value: &str) {
        self.backend.set_property(node, name, value);
        self.stats.writes += 1;
    }

    fn remove(&mut self, node: NodeId, name: &str) {
        self.backend.remove_property(node, name);
        self.stats.writes += 1;
    }

    fn compile(
        &self,
        el: &LayoutElement,
        prop: Prop,
        ty: ExprType,
        emitter: &mut ClosureEmitter,
    ) -> WidgetResult<Option<Thunk>> {
        let Some(value) = el.get(prop) else {
            return Ok(None);
        };
        let path = el.path.field(prop.name());
        Ok(Some(
            compile_property_value(value, ty, emitter, self.env(), &path)?.value,
        ))
    }

    fn eval(&self, thunk: &Thunk, as_flag: bool) -> Option<Value> {
        match thunk.eval(self.ctx) {
            Ok(v) => Some(v),
            Err(EvalFault::Missing(binding)) => {
                tracing::trace!(%binding, "unresolved binding");
                as_flag.then_some(Value::Bool(false))
            }
            Err(e) => {
                tracing::warn!(error = %e, "property evaluation failed");
                as_flag.then_some(Value::Bool(false))
            }
        }
    }

    fn value(&self, thunk: &Thunk, encoding: Encoding) -> Option<String> {
        let v = self.eval(thunk, encoding.is_flag())?;
        self.dialect.encode(encoding, &v, self.config)
    }

    fn flag(&self, thunk: &Thunk) -> bool {
        self.eval(thunk, true).is_some_and(|v| v.truthy())
    }

    /// Write the current value and keep the property if it can change.
    fn bind(
        &mut self,
        scope: &mut Scope,
        targets: Vec<NodeId>,
        names: &[&'static str],
        encoding: Encoding,
        thunk: Thunk,
    ) {
        if names.is_empty() {
            return;
        }
        let last = self.value(&thunk, encoding);
        if let Some(v) = &last {
            for t in &targets {
                for n in names {
                    self.set(*t, n, v);
                }
            }
        }
        if !thunk.deps().is_empty() {
            scope.bindings.push(BoundProperty {
                targets,
                names: names.to_vec(),
                encoding,
                thunk,
                last,
            });
        }
    }

    fn spacing(
        &mut self,
        scope: &mut Scope,
        container: NodeId,
        children: Option<&[NodeId]>,
        flow: Flow,
        thunk: &Thunk,
    ) {
        let (target, enc) = self.dialect.spacing(flow);
        match (target, children) {
            (SpacingTarget::Container(name), None) => {
                self.bind(scope, vec![container], &[name], enc, thunk.clone());
            }
            (SpacingTarget::FollowingChildren(name), Some(kids)) if kids.len() > 1 => {
                self.bind(scope, kids[1..].to_vec(), &[name], enc, thunk.clone());
            }
            _ => {}
        }
    }

    fn slot_key(&self, slot: &Slot) -> SlotKey {
        match &slot.kind {
            SlotKind::ForEach { items, limit, .. } => {
                let len = items
                    .as_ref()
                    .filter(|p| p.root == DataRoot::Data)
                    .and_then(|p| self.ctx.lookup(p))
                    .and_then(|v| v.as_array())
                    .map_or(0, Vec::len);
                SlotKey::Count(limit.map_or(len, |l| len.min(l)))
            }
            SlotKind::Conditional { condition } => SlotKey::Branch(self.flag(condition)),
        }
    }

    /// Create the view of `el` (at child indices `at`) and everything below it.
    fn element(
        &mut self,
        el: &LayoutElement,
        at: &mut Vec<usize>,
        prefix: &[Segment],
        parent: Flow,
        inherited: &[(&'static str, String)],
        scope: &mut Scope,
    ) -> WidgetResult<NodeId> {
        let mut emitter = ClosureEmitter::with_item(prefix.to_vec());
        let env = self.env();
        let mods = build_modifiers(el, &mut ExprCompiler::new(&mut emitter, env))?;

        let node = self.backend.create(self.dialect.tag(el.kind));
        for (k, v) in inherited {
            self.set(node, k, v);
        }
        let flow = match el.kind {
            ElementKind::Column => Flow::Vertical,
            ElementKind::Row => Flow::Horizontal,
            ElementKind::Stack => Flow::Overlay,
            ElementKind::ScrollView | ElementKind::ForEach if el.is_horizontal() => {
                Flow::Horizontal
            }
            ElementKind::ScrollView | ElementKind::ForEach => Flow::Vertical,
            _ => parent,
        };
        let content = match el.kind {
            ElementKind::Column | ElementKind::Row | ElementKind::Stack | ElementKind::ForEach => {
                for (k, v) in self.dialect.container_props(flow) {
                    self.set(node, k, v);
                }
                node
            }
            ElementKind::ScrollView => {
                for (k, v) in self.dialect.scroll_props(flow) {
                    self.set(node, k, v);
                }
                let inner = self.backend.create(self.dialect.scroll_content_tag());
                for (k, v) in self.dialect.container_props(flow) {
                    self.set(inner, k, v);
                }
                self.backend.append_child(node, inner);
                inner
            }
            ElementKind::Conditional => {
                for (k, v) in self.dialect.wrapper_props() {
                    self.set(node, k, v);
                }
                node
            }
            _ => node,
        };

        let mut child_props = match flow {
            Flow::Overlay if el.kind == ElementKind::Stack => self.dialect.overlay_child_props(),
            _ => Vec::new(),
        };
        let mut spacing = None;
        for m in mods.iter() {
            match (&m.value, m.attr) {
                (ModValue::Flag, attr) => {
                    let (k, v) = self.dialect.fill_prop(attr);
                    self.set(node, k, v);
                }
                (ModValue::Native(n), StyleAttr::Alignment) => {
                    self.align(content, flow, Axis::Horizontal, n, &mut child_props);
                }
                (ModValue::Native(n), StyleAttr::CrossAlignment) => {
                    self.align(content, flow, Axis::Vertical, n, &mut child_props);
                }
                (ModValue::Native(n), StyleAttr::TextAlign) => {
                    let name = self.dialect.text_align_prop();
                    self.set(node, name, n);
                }
                (ModValue::Native(n), attr) => {
                    for name in self.dialect.style_outputs(attr, el.kind).0 {
                        self.set(node, name, n);
                    }
                }
                (ModValue::Dynamic(t), StyleAttr::Spacing) => spacing = Some(t.value.clone()),
                (ModValue::Dynamic(t), attr) => {
                    let (names, enc) = self.dialect.style_outputs(attr, el.kind);
                    self.bind(scope, vec![node], names, enc, t.value.clone());
                }
            }
        }

        match el.kind {
            ElementKind::Column
            | ElementKind::Row
            | ElementKind::Stack
            | ElementKind::ScrollView => {
                let mut kids = Vec::with_capacity(el.children.len());
                for (i, c) in el.children.iter().enumerate() {
                    at.push(i);
                    let child = self.element(c, at, prefix, flow, &child_props, scope);
                    at.pop();
                    let child = child?;
                    self.backend.append_child(content, child);
                    kids.push(child);
                }
                if let Some(t) = &spacing {
                    self.spacing(scope, content, None, flow, t);
                    self.spacing(scope, content, Some(&kids), flow, t);
                }
            }
            ElementKind::Label => {
                if let Some(t) = self.compile(el, Prop::Text, ExprType::String, &mut emitter)? {
                    let name = self.dialect.text_prop();
                    self.bind(scope, vec![node], &[name], Encoding::Text, t);
                }
            }
            ElementKind::Image => {
                if let Some(t) = self.compile(el, Prop::Src, ExprType::String, &mut emitter)? {
                    self.bind(scope, vec![node], &["src"], Encoding::Text, t);
                }
                if let Some(t) = self.compile(el, Prop::Size, ExprType::Number, &mut emitter)? {
                    let (w, h, enc) = self.dialect.extent_props();
                    self.bind(scope, vec![node], &[w], enc, t.clone());
                    self.bind(scope, vec![node], &[h], enc, t);
                }
            }
            ElementKind::Spacer => {
                match self.compile(el, Prop::Size, ExprType::Number, &mut emitter)? {
                    Some(t) => {
                        let (w, h, enc) = self.dialect.extent_props();
                        if parent != Flow::Vertical {
                            self.bind(scope, vec![node], &[w], enc, t.clone());
                        }
                        if parent != Flow::Horizontal {
                            self.bind(scope, vec![node], &[h], enc, t);
                        }
                    }
                    None => {
                        if let Some((k, v)) = self.dialect.flexible_spacer() {
                            self.set(node, k, v);
                        }
                    }
                }
            }
            ElementKind::Divider => self.divider(el, node, parent, &mods, &mut emitter, scope)?,
            ElementKind::ForEach => {
                let items = match el.get(Prop::Items) {
                    Some(PropertyValue::Binding(b)) => emitter.absolute(b),
                    _ => None,
                };
                let limit = el
                    .get(Prop::Limit)
                    .and_then(PropertyValue::as_number)
                    .map(|n| n as usize);
                if let Some(t) = &spacing {
                    self.spacing(scope, node, None, flow, t);
                }
                let mut slot = Slot {
                    node,
                    element: at.clone(),
                    prefix: prefix.to_vec(),
                    flow,
                    inherited: child_props,
                    kind: SlotKind::ForEach {
                        items,
                        limit,
                        spacing,
                    },
                    key: SlotKey::Count(0),
                    scope: Scope::default(),
                };
                slot.key = self.slot_key(&slot);
                self.fill_slot(&mut slot, el)?;
                scope.slots.push(slot);
            }
            ElementKind::Conditional => {
                let condition = self
                    .compile(el, Prop::Condition, ExprType::Bool, &mut emitter)?
                    .unwrap_or_else(|| Thunk::constant(Value::Bool(false)));
                let mut slot = Slot {
                    node,
                    element: at.clone(),
                    prefix: prefix.to_vec(),
                    flow: parent,
                    inherited: inherited.to_vec(),
                    kind: SlotKind::Conditional { condition },
                    key: SlotKey::Branch(false),
                    scope: Scope::default(),
                };
                slot.key = self.slot_key(&slot);
                self.fill_slot(&mut slot, el)?;
                scope.slots.push(slot);
            }
        }
        Ok(node)
    }

    /// Container alignment goes on the content node, or on every child where the platform
    /// aligns per child.
    fn align(
        &mut self,
        content: NodeId,
        flow: Flow,
        axis: Axis,
        native: &str,
        child_props: &mut Vec<(&'static str, String)>,
    ) {
        let (name, on_children) = self.dialect.alignment_prop(flow, axis);
        if on_children {
            child_props.push((name, native.to_string()));
        } else {
            self.set(content, name, native);
        }
    }

    fn divider(
        &mut self,
        el: &LayoutElement,
        node: NodeId,
        parent: Flow,
        mods: &ModifierChain<Thunk>,
        emitter: &mut ClosureEmitter,
        scope: &mut Scope,
    ) -> WidgetResult<()> {
        let across = if parent == Flow::Horizontal {
            StyleAttr::FillHeight
        } else {
            StyleAttr::FillWidth
        };
        let (k, v) = self.dialect.fill_prop(across);
        self.set(node, k, v);

        let thickness = self
            .compile(el, Prop::Thickness, ExprType::Number, emitter)?
            .unwrap_or_else(|| Thunk::constant(Value::Number(1.0)));
        let (w, h, enc) = self.dialect.extent_props();
        let along = if parent == Flow::Horizontal { w } else { h };
        self.bind(scope, vec![node], &[along], enc, thickness);

        if mods.dynamic(StyleAttr::Color).is_none() {
            let (names, enc) = self.dialect.style_outputs(StyleAttr::Color, ElementKind::Divider);
            if let Some(v) = self.dialect.encode(enc, &Value::Color(DIVIDER_COLOR), self.config) {
                for n in names {
                    self.set(node, n, &v);
                }
            }
        }
        Ok(())
    }

    /// Build the children a slot's key selects.
    fn fill_slot(&mut self, slot: &mut Slot, el: &LayoutElement) -> WidgetResult<()> {
        let mut at = slot.element.clone();
        match (&slot.kind, slot.key) {
            (
                SlotKind::ForEach {
                    items: Some(items),
                    spacing,
                    ..
                },
                SlotKey::Count(n),
            ) => {
                let Some(template) = el.item_template() else {
                    return Ok(());
                };
                at.push(0);
                let mut kids = Vec::with_capacity(n);
                for i in 0..n {
                    let mut prefix = items.segments.clone();
                    prefix.push(Segment::Index(i));
                    let child = self.element(
                        template,
                        &mut at,
                        &prefix,
                        slot.flow,
                        &slot.inherited,
                        &mut slot.scope,
                    )?;
                    self.backend.append_child(slot.node, child);
                    kids.push(child);
                }
                if let Some(t) = spacing {
                    self.spacing(&mut slot.scope, slot.node, Some(&kids), slot.flow, t);
                }
            }
            (SlotKind::Conditional { .. }, SlotKey::Branch(taken)) => {
                let branch = if taken {
                    el.then_branch().map(|e| (0, e))
                } else {
                    el.else_branch().map(|e| (1, e))
                };
                if let Some((i, branch)) = branch {
                    at.push(i);
                    let child = self.element(
                        branch,
                        &mut at,
                        &slot.prefix,
                        slot.flow,
                        &slot.inherited,
                        &mut slot.scope,
                    )?;
                    self.backend.append_child(slot.node, child);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn refresh(
        &mut self,
        scope: &mut Scope,
        changed: &[DataPath],
        root: &LayoutElement,
    ) -> WidgetResult<()> {
        for b in &mut scope.bindings {
            if !touches(b.thunk.deps(), changed) {
                continue;
            }
            self.stats.evaluated += 1;
            let next = self.value(&b.thunk, b.encoding);
            if next == b.last {
                continue;
            }
            for t in &b.targets {
                for n in &b.names {
                    match &next {
                        Some(v) => self.set(*t, n, v),
                        None => self.remove(*t, n),
                    }
                }
            }
            b.last = next;
        }

        for slot in &mut scope.slots {
            if touches(slot.key_deps(), changed) {
                let key = self.slot_key(slot);
                if key != slot.key {
                    let el = root.descendant(&slot.element).ok_or_else(|| {
                        WidgetError::schema(
                            &JsonPath::root(),
                            "view handle does not match its layout",
                        )
                    })?;
                    self.backend.clear_children(slot.node);
                    slot.scope = Scope::default();
                    slot.key = key;
                    self.fill_slot(slot, el)?;
                    self.stats.rebuilt += 1;
                    tracing::trace!(?key, "slot rebuilt");
                    continue;
                }
            }
            self.refresh(&mut slot.scope, changed, root)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
