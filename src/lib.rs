//! widgetc compiles one declarative JSON widget layout into four renderings.
//!
//! - [`parse_layout`] loads and validates a [`WidgetLayout`]
//! - [`generate`] emits Kotlin for Jetpack Glance or Swift for SwiftUI
//! - [`Renderer`] interprets the layout into a live view tree for NativeScript or HTML and
//!   keeps it current with [`Renderer::update`]
//!
//! All backends share one expression compiler ([`compile_property_value`]) parameterised by an
//! [`Emitter`], and one style builder ([`build_modifiers`]).
#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub(crate) mod codegen;
pub(crate) mod expression;
pub(crate) mod foundation;
pub(crate) mod layout;
pub(crate) mod render;
pub(crate) mod style;

pub use crate::foundation::core::{CompiledPlatform, InterpretedPlatform, Platform, Rgba, Size};
pub use crate::foundation::error::{WidgetError, WidgetResult};
pub use crate::foundation::path::JsonPath;

pub use crate::layout::binding::{
    Binding, BindingScope, SETTINGS_PREFIX, Segment, TemplatePart, parse_template, setting_key,
};
pub use crate::layout::model::{
    ElementKind, LayoutElement, Literal, Prop, PropShape, PropertyValue, SizeSpec, WidgetLayout,
};
pub use crate::layout::parse::{parse_layout, parse_layout_value};

pub use crate::expression::ast::{Expr, ExprKind, Operator};
pub use crate::expression::compiler::{
    CompileEnv, Emitter, ExprCompiler, Fallback, compile_property_value,
};
pub use crate::expression::date::DatePattern;
pub use crate::expression::interp::{ClosureEmitter, EvalFault, Thunk};
pub use crate::expression::types::{ExprType, Typed};
pub use crate::expression::value::{Value, format_number, number_to_string, substring};

pub use crate::style::color::{Palette, parse_color, resolve_color};
pub use crate::style::config::{AlignKeyword, AlignmentTable, Axis, FontWeight, StyleConfig};
pub use crate::style::modifiers::{
    ModValue, Modifier, ModifierChain, StyleAttr, build_modifiers, modifier_order,
};

pub use crate::codegen::batch::{
    BatchOptions, BatchReport, GeneratedFile, WidgetOutcome, WriteStatus, discover_layouts,
    generate_batch, platform_dir,
};
pub use crate::codegen::glance::KotlinEmitter;
pub use crate::codegen::swiftui::SwiftEmitter;
pub use crate::codegen::{
    DEFAULT_KOTLIN_PACKAGE, GENERATOR_NAME, GENERATOR_VERSION, GeneratorOptions, SourceFile,
    generate, output_file_name,
};

pub use crate::render::backend::{NodeId, ViewBackend, ViewNode, ViewTree};
pub use crate::render::context::{DataContext, DataPath, DataRoot};
pub use crate::render::html::preview_page;
pub use crate::render::renderer::{Renderer, UpdateStats, ViewHandle};
