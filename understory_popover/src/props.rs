// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Props: the configuration snapshot of an instance.
//!
//! ## Overview
//!
//! [`Props`] is an immutable-per-generation snapshot. An instance never edits
//! its props in place; [`Popovers::set`](crate::Popovers::set) merges a
//! [`PropsPatch`] over the current snapshot and replaces it wholesale.
//!
//! Every value prop can also be written from a string with
//! [`PropsPatch::set_named`]. Names are matched ignoring case, `-` and `_`, so
//! `hideOnClick`, `hide-on-click` and `hide_on_click` are the same prop. This
//! is what the attribute resolver uses for `data-tippy-*` attributes.
//!
//! Lifecycle hooks live in [`Hooks`]. They observe an [`Instance`] and return
//! `false` to veto where documented.

use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use understory_dom::{Event, EventKind, NodeId, Selector};

use crate::Dom;
use crate::error::PropsError;
use crate::instance::Instance;
use crate::positioner::PlacementData;

/// The side of the reference an overlay is placed on.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Side {
    /// Above the reference.
    Top,
    /// Below the reference.
    Bottom,
    /// Left of the reference.
    Left,
    /// Right of the reference.
    Right,
}

impl Side {
    /// Lowercase name (`"top"`, …).
    pub const fn name(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Whether the overlay sits above or below the reference.
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }

    /// The opposite side.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Alignment along the side.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Alignment {
    /// Aligned with the start edge of the reference.
    Start,
    /// Aligned with the end edge of the reference.
    End,
}

/// A placement such as `top` or `right-start`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Placement {
    /// Basic placement.
    pub side: Side,
    /// Optional alignment variation; `None` centers the overlay.
    pub alignment: Option<Alignment>,
}

impl Placement {
    /// `top`
    pub const TOP: Self = Self::new(Side::Top);
    /// `bottom`
    pub const BOTTOM: Self = Self::new(Side::Bottom);
    /// `left`
    pub const LEFT: Self = Self::new(Side::Left);
    /// `right`
    pub const RIGHT: Self = Self::new(Side::Right);

    /// A centered placement on `side`.
    pub const fn new(side: Side) -> Self {
        Self {
            side,
            alignment: None,
        }
    }

    /// The same side with a different alignment.
    #[must_use]
    pub const fn with_alignment(self, alignment: Alignment) -> Self {
        Self {
            side: self.side,
            alignment: Some(alignment),
        }
    }
}

impl From<Side> for Placement {
    fn from(side: Side) -> Self {
        Self::new(side)
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.side.name())?;
        match self.alignment {
            Some(Alignment::Start) => f.write_str("-start"),
            Some(Alignment::End) => f.write_str("-end"),
            None => Ok(()),
        }
    }
}

impl FromStr for Placement {
    type Err = PropsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PropsError::InvalidValue {
            prop: "placement",
            value: s.into(),
        };
        let (side, alignment) = match s.trim().split_once('-') {
            Some((side, alignment)) => (side, Some(alignment)),
            None => (s.trim(), None),
        };
        let side = match side {
            "top" => Side::Top,
            "bottom" => Side::Bottom,
            "left" => Side::Left,
            "right" => Side::Right,
            _ => return Err(invalid()),
        };
        let alignment = match alignment {
            None => None,
            Some("start") => Some(Alignment::Start),
            Some("end") => Some(Alignment::End),
            Some(_) => return Err(invalid()),
        };
        Ok(Self { side, alignment })
    }
}

/// Per-side lengths, used for overflow padding.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Padding {
    /// Top.
    pub top: f64,
    /// Right.
    pub right: f64,
    /// Bottom.
    pub bottom: f64,
    /// Left.
    pub left: f64,
}

impl Padding {
    /// The same length on every side.
    pub const fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    /// Length on `side`.
    pub const fn side(&self, side: Side) -> f64 {
        match side {
            Side::Top => self.top,
            Side::Right => self.right,
            Side::Bottom => self.bottom,
            Side::Left => self.left,
        }
    }

    /// Set the length on `side`.
    pub fn set_side(&mut self, side: Side, v: f64) {
        match side {
            Side::Top => self.top = v,
            Side::Right => self.right = v,
            Side::Bottom => self.bottom = v,
            Side::Left => self.left = v,
        }
    }
}

/// A delay or duration: one value for both directions, or `(show, hide)`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Timing {
    /// Same value for show and hide.
    Single(u32),
    /// `(show, hide)`.
    Pair(u32, u32),
}

impl Timing {
    /// Value for `index` (0 = show, 1 = hide).
    pub const fn get(self, index: usize) -> u32 {
        match self {
            Self::Single(v) => v,
            Self::Pair(show, hide) => {
                if index == 0 {
                    show
                } else {
                    hide
                }
            }
        }
    }
}

impl From<u32> for Timing {
    fn from(v: u32) -> Self {
        Self::Single(v)
    }
}

impl From<(u32, u32)> for Timing {
    fn from((show, hide): (u32, u32)) -> Self {
        Self::Pair(show, hide)
    }
}

impl From<[u32; 2]> for Timing {
    fn from([show, hide]: [u32; 2]) -> Self {
        Self::Pair(show, hide)
    }
}

impl FromStr for Timing {
    type Err = PropsError;

    /// Accepts `100`, `100, 200` and `[100, 200]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PropsError::InvalidValue {
            prop: "timing",
            value: s.into(),
        };
        let inner = s.trim().trim_start_matches('[').trim_end_matches(']');
        let mut parts = inner.split(',').map(|p| p.trim().parse::<u32>());
        let first = parts.next().ok_or_else(invalid)?.map_err(|_| invalid())?;
        match parts.next() {
            None => Ok(Self::Single(first)),
            Some(second) => {
                let second = second.map_err(|_| invalid())?;
                if parts.next().is_some() {
                    return Err(invalid());
                }
                Ok(Self::Pair(first, second))
            }
        }
    }
}

/// One entry of the trigger list.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Trigger {
    /// Only programmatic show/hide.
    Manual,
    /// Show on this event type.
    Event(EventKind),
}

/// Whitespace-separated list of trigger event types, such as `"mouseenter focus"`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Triggers(Vec<Trigger>);

impl Triggers {
    /// Programmatic control only.
    pub fn manual() -> Self {
        Self(alloc::vec![Trigger::Manual])
    }

    /// Parse a whitespace-separated list.
    pub fn parse(s: &str) -> Result<Self, PropsError> {
        s.parse()
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Trigger> + '_ {
        self.0.iter().copied()
    }

    /// Whether `kind` is one of the triggers.
    pub fn contains(&self, kind: EventKind) -> bool {
        self.0.contains(&Trigger::Event(kind))
    }
}

impl Default for Triggers {
    fn default() -> Self {
        Self(alloc::vec![
            Trigger::Event(EventKind::MouseEnter),
            Trigger::Event(EventKind::Focus),
        ])
    }
}

impl From<EventKind> for Triggers {
    fn from(kind: EventKind) -> Self {
        Self(alloc::vec![Trigger::Event(kind)])
    }
}

impl From<&[EventKind]> for Triggers {
    fn from(kinds: &[EventKind]) -> Self {
        Self(kinds.iter().map(|k| Trigger::Event(*k)).collect())
    }
}

impl FromStr for Triggers {
    type Err = PropsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut out = Vec::new();
        for name in s.split_whitespace() {
            if name == "manual" {
                out.push(Trigger::Manual);
            } else {
                out.push(Trigger::Event(name.parse()?));
            }
        }
        Ok(Self(out))
    }
}

impl fmt::Display for Triggers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, t) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match t {
                Trigger::Manual => f.write_str("manual")?,
                Trigger::Event(kind) => f.write_str(kind.name())?,
            }
        }
        Ok(())
    }
}

/// What clicking does to a visible overlay.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum HideOnClick {
    /// Clicks on the reference (when click-triggered) and outside clicks hide.
    Always,
    /// Clicks never hide.
    Never,
    /// Only clicking the reference toggles; outside clicks are ignored.
    Toggle,
}

impl From<bool> for HideOnClick {
    fn from(v: bool) -> Self {
        if v { Self::Always } else { Self::Never }
    }
}

impl FromStr for HideOnClick {
    type Err = PropsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "true" | "" => Ok(Self::Always),
            "false" => Ok(Self::Never),
            "toggle" => Ok(Self::Toggle),
            _ => Err(PropsError::InvalidValue {
                prop: "hide_on_click",
                value: s.into(),
            }),
        }
    }
}

/// Cursor-follow mode.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FollowCursor {
    /// Anchor to the reference.
    Off,
    /// Follow on both axes.
    Both,
    /// Follow horizontally; vertical position comes from the reference.
    Horizontal,
    /// Follow vertically; horizontal position comes from the reference.
    Vertical,
    /// Take the cursor position once, when shown.
    Initial,
}

impl From<bool> for FollowCursor {
    fn from(v: bool) -> Self {
        if v { Self::Both } else { Self::Off }
    }
}

impl FromStr for FollowCursor {
    type Err = PropsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "false" => Ok(Self::Off),
            "true" | "" => Ok(Self::Both),
            "horizontal" => Ok(Self::Horizontal),
            "vertical" => Ok(Self::Vertical),
            "initial" => Ok(Self::Initial),
            _ => Err(PropsError::InvalidValue {
                prop: "follow_cursor",
                value: s.into(),
            }),
        }
    }
}

/// Arrow shape.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ArrowType {
    /// CSS triangle (`tippy-arrow`).
    Sharp,
    /// Rounded SVG arrow (`tippy-roundarrow`).
    Round,
}

impl FromStr for ArrowType {
    type Err = PropsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sharp" => Ok(Self::Sharp),
            "round" => Ok(Self::Round),
            _ => Err(PropsError::InvalidValue {
                prop: "arrow_type",
                value: s.into(),
            }),
        }
    }
}

/// The area the positioner keeps the overlay inside.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Boundary {
    /// Nearest scrolling ancestor.
    ScrollParent,
    /// The whole window.
    Window,
    /// The visible viewport.
    Viewport,
    /// A specific element.
    Element(NodeId),
}

impl FromStr for Boundary {
    type Err = PropsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scrollParent" | "scrollparent" => Ok(Self::ScrollParent),
            "window" => Ok(Self::Window),
            "viewport" => Ok(Self::Viewport),
            _ => Err(PropsError::InvalidValue {
                prop: "boundary",
                value: s.into(),
            }),
        }
    }
}

/// Callback choosing the mount parent for a reference.
pub type AppendToFn = Rc<dyn Fn(&Dom, NodeId) -> NodeId>;

/// Where the overlay is attached when mounted.
#[derive(Clone)]
pub enum AppendTo {
    /// The document body.
    Body,
    /// The reference's parent node.
    Parent,
    /// A fixed element.
    Element(NodeId),
    /// Computed from the reference.
    Callback(AppendToFn),
}

impl fmt::Debug for AppendTo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Body => f.write_str("Body"),
            Self::Parent => f.write_str("Parent"),
            Self::Element(n) => f.debug_tuple("Element").field(n).finish(),
            Self::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

impl PartialEq for AppendTo {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Body, Self::Body) | (Self::Parent, Self::Parent) => true,
            (Self::Element(a), Self::Element(b)) => a == b,
            (Self::Callback(a), Self::Callback(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<NodeId> for AppendTo {
    fn from(node: NodeId) -> Self {
        Self::Element(node)
    }
}

impl FromStr for AppendTo {
    type Err = PropsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parent" => Ok(Self::Parent),
            "body" => Ok(Self::Body),
            _ => Err(PropsError::InvalidValue {
                prop: "append_to",
                value: s.into(),
            }),
        }
    }
}

/// Callback producing text content for a reference.
pub type ContentFn = Rc<dyn Fn(&Dom, NodeId) -> String>;

/// Overlay content.
#[derive(Clone)]
pub enum Content {
    /// Plain text.
    Text(String),
    /// An existing element, moved into the overlay.
    Element(NodeId),
    /// Computed from the reference when props are resolved.
    Callback(ContentFn),
}

impl Content {
    /// Content computed from the reference element.
    pub fn from_fn(f: impl Fn(&Dom, NodeId) -> String + 'static) -> Self {
        Self::Callback(Rc::new(f))
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(t) => f.debug_tuple("Text").field(t).finish(),
            Self::Element(n) => f.debug_tuple("Element").field(n).finish(),
            Self::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

impl PartialEq for Content {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Element(a), Self::Element(b)) => a == b,
            (Self::Callback(a), Self::Callback(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Self::Text(s.into())
    }
}

impl From<String> for Content {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<NodeId> for Content {
    fn from(node: NodeId) -> Self {
        Self::Element(node)
    }
}

/// Order of fallback placements tried by the positioner's flip behavior.
#[derive(Clone, Debug, PartialEq)]
pub enum FlipBehavior {
    /// Flip to the opposite side.
    Flip,
    /// Rotate clockwise through the sides.
    Clockwise,
    /// Rotate counterclockwise through the sides.
    Counterclockwise,
    /// Try these placements in order.
    Placements(Vec<Placement>),
}

impl FromStr for FlipBehavior {
    type Err = PropsError;

    /// Accepts `flip`, `clockwise`, `counterclockwise` or a placement list such as `["top", "bottom"]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "flip" => Ok(Self::Flip),
            "clockwise" => Ok(Self::Clockwise),
            "counterclockwise" => Ok(Self::Counterclockwise),
            list => {
                let inner = list.trim_start_matches('[').trim_end_matches(']');
                let placements = inner
                    .split([',', ' '])
                    .map(|p| p.trim().trim_matches(|c| c == '"' || c == '\''))
                    .filter(|p| !p.is_empty())
                    .map(str::parse)
                    .collect::<Result<Vec<Placement>, _>>()
                    .map_err(|_| PropsError::InvalidValue {
                        prop: "flip_behavior",
                        value: s.into(),
                    })?;
                if placements.is_empty() {
                    return Err(PropsError::InvalidValue {
                        prop: "flip_behavior",
                        value: s.into(),
                    });
                }
                Ok(Self::Placements(placements))
            }
        }
    }
}

/// Callback receiving placement results from the positioner.
pub type PlacementHook = Rc<dyn Fn(&PlacementData)>;

/// Options passed through to the positioner.
#[derive(Clone, Default)]
pub struct PopperOptions {
    /// Overflow padding; the positioner default (5px on every side) when `None`.
    pub padding: Option<Padding>,
    /// Flip padding; `distance + 5` when `None`.
    pub flip_padding: Option<f64>,
    /// Cross-axis offset override for [`Props::offset`].
    pub offset: Option<f64>,
    /// Called after the first computation of a fresh positioner.
    pub on_create: Option<PlacementHook>,
    /// Called after every later computation.
    pub on_update: Option<PlacementHook>,
}

impl fmt::Debug for PopperOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PopperOptions")
            .field("padding", &self.padding)
            .field("flip_padding", &self.flip_padding)
            .field("offset", &self.offset)
            .field("on_create", &self.on_create.is_some())
            .field("on_update", &self.on_update.is_some())
            .finish()
    }
}

impl PartialEq for PopperOptions {
    fn eq(&self, other: &Self) -> bool {
        fn same(a: &Option<PlacementHook>, b: &Option<PlacementHook>) -> bool {
            match (a, b) {
                (None, None) => true,
                (Some(a), Some(b)) => Rc::ptr_eq(a, b),
                _ => false,
            }
        }
        self.padding == other.padding
            && self.flip_padding == other.flip_padding
            && self.offset == other.offset
            && same(&self.on_create, &other.on_create)
            && same(&self.on_update, &other.on_update)
    }
}

/// Hook receiving the instance.
pub type InstanceHook = Rc<dyn Fn(&Instance)>;
/// Hook that may veto by returning `false`.
pub type VetoHook = Rc<dyn Fn(&Instance) -> bool>;
/// Hook receiving the instance and the triggering event.
pub type EventHook = Rc<dyn Fn(&Instance, &Event)>;
/// Event hook that may veto by returning `false`.
pub type EventVetoHook = Rc<dyn Fn(&Instance, &Event) -> bool>;
/// Asynchronous show gate; the host calls [`Popovers::show`](crate::Popovers::show) when ready.
pub type WaitHook = Rc<dyn Fn(&Instance, Option<&Event>)>;

/// Lifecycle hooks.
#[derive(Clone, Default)]
pub struct Hooks {
    /// End of construction.
    pub on_create: Option<InstanceHook>,
    /// Before showing; `false` aborts with no side effects.
    pub on_show: Option<VetoHook>,
    /// After the show transition completed.
    pub on_shown: Option<InstanceHook>,
    /// Before hiding; `false` aborts with no side effects.
    pub on_hide: Option<VetoHook>,
    /// After the hide transition completed and the overlay was detached.
    pub on_hidden: Option<InstanceHook>,
    /// The overlay was attached to its mount parent.
    pub on_mount: Option<InstanceHook>,
    /// A trigger event scheduled a show.
    pub on_trigger: Option<EventHook>,
    /// A trigger event scheduled a hide.
    pub on_untrigger: Option<EventHook>,
    /// Pointer moved outside an interactive overlay; `false` keeps it open.
    pub on_mouse_move: Option<EventVetoHook>,
    /// Replaces the show delay with a host-controlled gate.
    pub wait: Option<WaitHook>,
}

impl Hooks {
    fn apply_to(&self, out: &mut Self) {
        fn pick<T: Clone>(from: &Option<T>, to: &mut Option<T>) {
            if from.is_some() {
                to.clone_from(from);
            }
        }
        pick(&self.on_create, &mut out.on_create);
        pick(&self.on_show, &mut out.on_show);
        pick(&self.on_shown, &mut out.on_shown);
        pick(&self.on_hide, &mut out.on_hide);
        pick(&self.on_hidden, &mut out.on_hidden);
        pick(&self.on_mount, &mut out.on_mount);
        pick(&self.on_trigger, &mut out.on_trigger);
        pick(&self.on_untrigger, &mut out.on_untrigger);
        pick(&self.on_mouse_move, &mut out.on_mouse_move);
        pick(&self.wait, &mut out.wait);
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut set = f.debug_set();
        let all = [
            ("on_create", self.on_create.is_some()),
            ("on_show", self.on_show.is_some()),
            ("on_shown", self.on_shown.is_some()),
            ("on_hide", self.on_hide.is_some()),
            ("on_hidden", self.on_hidden.is_some()),
            ("on_mount", self.on_mount.is_some()),
            ("on_trigger", self.on_trigger.is_some()),
            ("on_untrigger", self.on_untrigger.is_some()),
            ("on_mouse_move", self.on_mouse_move.is_some()),
            ("wait", self.wait.is_some()),
        ];
        for (name, present) in all {
            if present {
                set.entry(&name);
            }
        }
        set.finish()
    }
}

/// Parsing of a prop value from its string form.
trait PropValue: Sized {
    fn parse_value(prop: &'static str, value: &str) -> Result<Self, PropsError>;
}

fn parse_with<T: FromStr<Err = PropsError>>(
    prop: &'static str,
    value: &str,
) -> Result<T, PropsError> {
    value.trim().parse::<T>().map_err(|e| match e {
        PropsError::InvalidValue { value, .. } => PropsError::InvalidValue { prop, value },
        other => other,
    })
}

macro_rules! from_str_props {
    ($($ty:ty),*) => {
        $(impl PropValue for $ty {
            fn parse_value(prop: &'static str, value: &str) -> Result<Self, PropsError> {
                parse_with(prop, value)
            }
        })*
    };
}

from_str_props!(
    Timing,
    Placement,
    Triggers,
    HideOnClick,
    FollowCursor,
    ArrowType,
    Boundary,
    AppendTo,
    FlipBehavior
);

impl PropValue for bool {
    fn parse_value(prop: &'static str, value: &str) -> Result<Self, PropsError> {
        match value.trim() {
            "true" | "" => Ok(true),
            "false" => Ok(false),
            _ => Err(PropsError::InvalidValue {
                prop,
                value: value.into(),
            }),
        }
    }
}

impl PropValue for f64 {
    fn parse_value(prop: &'static str, value: &str) -> Result<Self, PropsError> {
        value.trim().parse().map_err(|_| PropsError::InvalidValue {
            prop,
            value: value.into(),
        })
    }
}

impl PropValue for u32 {
    fn parse_value(prop: &'static str, value: &str) -> Result<Self, PropsError> {
        value.trim().parse().map_err(|_| PropsError::InvalidValue {
            prop,
            value: value.into(),
        })
    }
}

impl PropValue for String {
    fn parse_value(_: &'static str, value: &str) -> Result<Self, PropsError> {
        Ok(value.to_string())
    }
}

impl PropValue for Option<String> {
    fn parse_value(_: &'static str, value: &str) -> Result<Self, PropsError> {
        match value.trim() {
            "" | "null" => Ok(None),
            v => Ok(Some(v.to_string())),
        }
    }
}

impl PropValue for Content {
    fn parse_value(_: &'static str, value: &str) -> Result<Self, PropsError> {
        Ok(Self::Text(value.to_string()))
    }
}

impl PropValue for Option<Selector> {
    fn parse_value(_: &'static str, value: &str) -> Result<Self, PropsError> {
        match value.trim() {
            "" => Ok(None),
            v => Ok(Some(Selector::parse(v)?)),
        }
    }
}

impl PropValue for Option<NodeId> {
    fn parse_value(prop: &'static str, _: &str) -> Result<Self, PropsError> {
        Err(PropsError::NotNamed(prop))
    }
}

impl PropValue for PopperOptions {
    fn parse_value(prop: &'static str, _: &str) -> Result<Self, PropsError> {
        Err(PropsError::NotNamed(prop))
    }
}

/// Compare prop names ignoring ASCII case, `-` and `_`.
fn same_name(a: &str, b: &str) -> bool {
    let norm = |s: &str| {
        s.chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect::<Vec<_>>()
    };
    norm(a) == norm(b)
}

macro_rules! props {
    ($($(#[$doc:meta])* $name:ident : $ty:ty = $default:expr,)*) => {
        /// A finalized configuration snapshot.
        ///
        /// See the module docs for naming and the `Default` impl for default values.
        #[derive(Clone)]
        pub struct Props {
            $($(#[$doc])* pub $name: $ty,)*
            /// Lifecycle hooks.
            pub hooks: Hooks,
        }

        impl Default for Props {
            fn default() -> Self {
                Self {
                    $($name: $default,)*
                    hooks: Hooks::default(),
                }
            }
        }

        impl fmt::Debug for Props {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct("Props")
                    $(.field(stringify!($name), &self.$name))*
                    .field("hooks", &self.hooks)
                    .finish()
            }
        }

        /// A partial update of [`Props`]; unset fields keep their current value.
        #[derive(Clone, Default)]
        pub struct PropsPatch {
            $($name: Option<$ty>,)*
            hooks: Hooks,
        }

        impl fmt::Debug for PropsPatch {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let mut s = f.debug_struct("PropsPatch");
                $(if let Some(v) = &self.$name {
                    s.field(stringify!($name), v);
                })*
                s.field("hooks", &self.hooks).finish_non_exhaustive()
            }
        }

        impl PropsPatch {
            /// Names of every value prop, in snake case.
            pub const NAMES: &'static [&'static str] = &[$(stringify!($name)),*];

            $(
                $(#[$doc])*
                #[must_use]
                pub fn $name(mut self, value: impl Into<$ty>) -> Self {
                    self.$name = Some(value.into());
                    self
                }
            )*

            /// Write every set field (and hook) over `props`.
            pub fn apply_to(&self, props: &mut Props) {
                $(if let Some(v) = &self.$name {
                    props.$name = v.clone();
                })*
                self.hooks.apply_to(&mut props.hooks);
            }

            /// Set a value prop from its string form.
            ///
            /// Unknown names return [`PropsError::UnknownProp`] and, in debug builds,
            /// log a warning.
            pub fn set_named(&mut self, name: &str, value: &str) -> Result<(), PropsError> {
                $(if same_name(name, stringify!($name)) {
                    self.$name = Some(<$ty as PropValue>::parse_value(stringify!($name), value)?);
                    return Ok(());
                })*
                if cfg!(debug_assertions) {
                    tracing::warn!(prop = name, "unknown prop; it is ignored");
                }
                Err(PropsError::UnknownProp(name.into()))
            }
        }
    };
}

props! {
    /// Where the overlay is attached while mounted.
    append_to: AppendTo = AppendTo::Body,
    /// Name of the `aria-*` attribute written on the trigger target while shown; `None` disables it.
    aria: Option<String> = Some("describedby".into()),
    /// Whether a backdrop fills the tooltip on show. Forced off when `arrow` is set.
    animate_fill: bool = true,
    /// Animation name written to `data-animation`.
    animation: String = "shift-away".into(),
    /// Whether the overlay has an arrow.
    arrow: bool = false,
    /// Arrow shape.
    arrow_type: ArrowType = ArrowType::Sharp,
    /// Overflow boundary passed to the positioner.
    boundary: Boundary = Boundary::ScrollParent,
    /// Overlay content.
    content: Content = Content::Text(String::new()),
    /// Show and hide delays in milliseconds.
    delay: Timing = Timing::Single(0),
    /// Gap between the reference and the tooltip, in pixels.
    distance: f64 = 10.0,
    /// Show and hide transition durations in milliseconds.
    duration: Timing = Timing::Pair(325, 275),
    /// Whether the positioner may flip the placement.
    flip: bool = true,
    /// Fallback order for flipping.
    flip_behavior: FlipBehavior = FlipBehavior::Flip,
    /// Whether flipping stays enabled after the first computation.
    flip_on_update: bool = false,
    /// Cursor-follow mode.
    follow_cursor: FollowCursor = FollowCursor::Off,
    /// Click-to-hide behavior.
    hide_on_click: HideOnClick = HideOnClick::Always,
    /// Skip `data-tippy-*` attributes of the reference.
    ignore_attributes: bool = false,
    /// Whether the transition uses an inertia easing.
    inertia: bool = false,
    /// Keep the overlay open while the pointer is over it; clicks inside do not hide it.
    interactive: bool = false,
    /// Hover tolerance around an interactive overlay, in pixels.
    interactive_border: f64 = 2.0,
    /// Debounce of the interactive hover-exit check, in milliseconds.
    interactive_debounce: u32 = 0,
    /// Create the positioner on first mount instead of at construction.
    lazy: bool = true,
    /// Maximum tooltip width in pixels.
    max_width: f64 = 350.0,
    /// Allow more than one instance per reference.
    multiple: bool = false,
    /// Cross-axis offset in pixels.
    offset: f64 = 0.0,
    /// Preferred placement.
    placement: Placement = Placement::TOP,
    /// Positioner passthrough.
    popper_options: PopperOptions = PopperOptions::default(),
    /// `role` attribute of the overlay.
    role: Option<String> = Some("tooltip".into()),
    /// Schedule a show right after construction.
    show_on_init: bool = false,
    /// Size name written to `data-size`.
    size: String = "regular".into(),
    /// Recompute the position on every animation frame while mounted.
    sticky: bool = false,
    /// Delegation selector; matching descendants get their own instance on demand.
    target: Option<Selector> = None,
    /// Space-separated theme names; each adds a `<name>-theme` class to the tooltip.
    theme: String = "dark".into(),
    /// Allow showing while touch input is in use.
    touch: bool = true,
    /// Show on touch hold (`touchstart`/`touchend`) instead of emulated mouse events.
    touch_hold: bool = false,
    /// Trigger event types.
    trigger: Triggers = Triggers::default(),
    /// Node receiving the trigger listeners instead of the reference.
    trigger_target: Option<NodeId> = None,
    /// Transition duration of the overlay position itself, in milliseconds.
    update_duration: u32 = 0,
    /// `z-index` of the overlay.
    z_index: u32 = 9999,
}

impl Props {
    /// The node trigger listeners are attached to.
    pub fn trigger_target_or(&self, reference: NodeId) -> NodeId {
        self.trigger_target.unwrap_or(reference)
    }
}

impl PropsPatch {
    /// An empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a patch from `(name, value)` string pairs.
    ///
    /// Recognized pairs apply even when others fail; the failures are returned alongside.
    pub fn from_pairs<'a>(
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> (Self, Vec<PropsError>) {
        let mut patch = Self::new();
        let mut errors = Vec::new();
        for (name, value) in pairs {
            if let Err(e) = patch.set_named(name, value) {
                errors.push(e);
            }
        }
        (patch, errors)
    }

    /// Whether this patch changes a prop the positioner is built from.
    ///
    /// A change means the prop is set in the patch and differs from `prev`.
    pub fn changes_positioning(&self, prev: &Props) -> bool {
        fn differs<T: PartialEq>(next: &Option<T>, prev: &T) -> bool {
            next.as_ref().is_some_and(|v| v != prev)
        }
        differs(&self.arrow, &prev.arrow)
            || differs(&self.arrow_type, &prev.arrow_type)
            || differs(&self.boundary, &prev.boundary)
            || differs(&self.distance, &prev.distance)
            || differs(&self.flip, &prev.flip)
            || differs(&self.flip_behavior, &prev.flip_behavior)
            || differs(&self.flip_on_update, &prev.flip_on_update)
            || differs(&self.offset, &prev.offset)
            || differs(&self.placement, &prev.placement)
            || differs(&self.popper_options, &prev.popper_options)
    }

    /// The `ignore_attributes` value, if set.
    pub fn ignore_attributes_value(&self) -> Option<bool> {
        self.ignore_attributes
    }

    /// Set [`Hooks::on_create`].
    #[must_use]
    pub fn on_create(mut self, f: impl Fn(&Instance) + 'static) -> Self {
        self.hooks.on_create = Some(Rc::new(f));
        self
    }

    /// Set [`Hooks::on_show`].
    #[must_use]
    pub fn on_show(mut self, f: impl Fn(&Instance) -> bool + 'static) -> Self {
        self.hooks.on_show = Some(Rc::new(f));
        self
    }

    /// Set [`Hooks::on_shown`].
    #[must_use]
    pub fn on_shown(mut self, f: impl Fn(&Instance) + 'static) -> Self {
        self.hooks.on_shown = Some(Rc::new(f));
        self
    }

    /// Set [`Hooks::on_hide`].
    #[must_use]
    pub fn on_hide(mut self, f: impl Fn(&Instance) -> bool + 'static) -> Self {
        self.hooks.on_hide = Some(Rc::new(f));
        self
    }

    /// Set [`Hooks::on_hidden`].
    #[must_use]
    pub fn on_hidden(mut self, f: impl Fn(&Instance) + 'static) -> Self {
        self.hooks.on_hidden = Some(Rc::new(f));
        self
    }

    /// Set [`Hooks::on_mount`].
    #[must_use]
    pub fn on_mount(mut self, f: impl Fn(&Instance) + 'static) -> Self {
        self.hooks.on_mount = Some(Rc::new(f));
        self
    }

    /// Set [`Hooks::on_trigger`].
    #[must_use]
    pub fn on_trigger(mut self, f: impl Fn(&Instance, &Event) + 'static) -> Self {
        self.hooks.on_trigger = Some(Rc::new(f));
        self
    }

    /// Set [`Hooks::on_untrigger`].
    #[must_use]
    pub fn on_untrigger(mut self, f: impl Fn(&Instance, &Event) + 'static) -> Self {
        self.hooks.on_untrigger = Some(Rc::new(f));
        self
    }

    /// Set [`Hooks::on_mouse_move`].
    #[must_use]
    pub fn on_mouse_move(mut self, f: impl Fn(&Instance, &Event) -> bool + 'static) -> Self {
        self.hooks.on_mouse_move = Some(Rc::new(f));
        self
    }

    /// Set [`Hooks::wait`].
    #[must_use]
    pub fn wait(mut self, f: impl Fn(&Instance, Option<&Event>) + 'static) -> Self {
        self.hooks.wait = Some(Rc::new(f));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn placements_parse_and_display() {
        let p: Placement = "right-start".parse().unwrap();
        assert_eq!(p, Placement::RIGHT.with_alignment(Alignment::Start));
        assert_eq!(p.to_string(), "right-start");
        assert_eq!("top".parse::<Placement>().unwrap(), Placement::TOP);
        assert!("middle".parse::<Placement>().is_err());
        assert!("top-center".parse::<Placement>().is_err());
    }

    #[test]
    fn timing_forms() {
        assert_eq!("100".parse::<Timing>().unwrap(), Timing::Single(100));
        assert_eq!("[100, 200]".parse::<Timing>().unwrap(), Timing::Pair(100, 200));
        assert_eq!("50,0".parse::<Timing>().unwrap(), Timing::Pair(50, 0));
        assert!("1,2,3".parse::<Timing>().is_err());
        assert_eq!(Timing::Pair(325, 275).get(1), 275);
        assert_eq!(Timing::Single(7).get(1), 7);
    }

    #[test]
    fn triggers_parse_whitespace_lists() {
        let t = Triggers::parse("  mouseenter   click manual ").unwrap();
        assert_eq!(
            t.iter().collect::<Vec<_>>(),
            vec![
                Trigger::Event(EventKind::MouseEnter),
                Trigger::Event(EventKind::Click),
                Trigger::Manual,
            ]
        );
        assert!(t.contains(EventKind::Click));
        assert_eq!(t.to_string(), "mouseenter click manual");
        assert!(matches!(
            Triggers::parse("hover"),
            Err(PropsError::Trigger(_))
        ));
    }

    #[test]
    fn set_named_normalizes_names() {
        let mut patch = PropsPatch::new();
        patch.set_named("hideOnClick", "toggle").unwrap();
        patch.set_named("interactive-debounce", "40").unwrap();
        patch.set_named("PLACEMENT", "bottom-end").unwrap();
        let mut props = Props::default();
        patch.apply_to(&mut props);
        assert_eq!(props.hide_on_click, HideOnClick::Toggle);
        assert_eq!(props.interactive_debounce, 40);
        assert_eq!(
            props.placement,
            Placement::BOTTOM.with_alignment(Alignment::End)
        );
    }

    #[test]
    fn set_named_reports_the_canonical_prop() {
        let mut patch = PropsPatch::new();
        assert_eq!(
            patch.set_named("delay", "soon"),
            Err(PropsError::InvalidValue {
                prop: "delay",
                value: "soon".into()
            })
        );
        assert_eq!(
            patch.set_named("triggerTarget", "x"),
            Err(PropsError::NotNamed("trigger_target"))
        );
        assert_eq!(
            patch.set_named("colour", "red"),
            Err(PropsError::UnknownProp("colour".into()))
        );
    }

    #[test]
    fn from_pairs_keeps_recognized_keys() {
        let (patch, errors) =
            PropsPatch::from_pairs([("bogus", "1"), ("arrow", "true"), ("delay", "[1,2]")]);
        assert_eq!(errors.len(), 1);
        let mut props = Props::default();
        patch.apply_to(&mut props);
        assert!(props.arrow);
        assert_eq!(props.delay, Timing::Pair(1, 2));
    }

    #[test]
    fn positioning_changes_require_a_different_value() {
        let prev = Props::default();
        assert!(!PropsPatch::new().content("x").changes_positioning(&prev));
        assert!(!PropsPatch::new()
            .placement(Placement::TOP)
            .changes_positioning(&prev));
        assert!(PropsPatch::new()
            .placement(Placement::BOTTOM)
            .changes_positioning(&prev));
        assert!(PropsPatch::new().distance(4).changes_positioning(&prev));
    }

    #[test]
    fn hooks_merge_without_clearing() {
        let mut props = Props::default();
        PropsPatch::new()
            .on_show(|_| false)
            .apply_to(&mut props);
        PropsPatch::new().on_hidden(|_| {}).apply_to(&mut props);
        assert!(props.hooks.on_show.is_some());
        assert!(props.hooks.on_hidden.is_some());
    }
}
