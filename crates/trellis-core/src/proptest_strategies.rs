//! Proptest strategies for screen documents and contexts
//!
//! Reusable generators for binder, cache and wire-format property tests.

use crate::actions::handler_fn;
use crate::context::RenderContext;
use crate::model::{Component, ComponentKind, Screen};
use crate::style::{Color, Palette};
use proptest::prelude::*;
use serde_json::{json, Value};

/// Component ids: short camelCase identifiers
pub fn arb_id() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9]{0,8}"
}

/// Dotted paths, a mix of ones [`arb_context`] can answer and ones it can't
pub fn arb_context_path() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("user.name"),
        Just("user.role"),
        Just("weather.summary"),
        Just("jobs.count"),
        Just("sync.pendingCount"),
        Just("route.alertSummary"),
    ]
}

/// Fields present (or not) on the items of [`arb_job`]
pub fn arb_item_key() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        3 => Just("customerName"),
        2 => Just("address"),
        1 => Just("window"),
        1 => Just("urgent"),
        1 => Just("notes"),
    ]
}

/// Literal text with up to two `{{token}}` placeholders
pub fn arb_text() -> impl Strategy<Value = String> {
    (
        "[a-zA-Z ]{0,16}",
        prop::option::of(arb_context_path()),
        prop::option::of(arb_context_path()),
    )
        .prop_map(|(words, first, second)| {
            let mut text = words;
            for path in [first, second].into_iter().flatten() {
                text.push_str(&format!(" {{{{{path}}}}}"));
            }
            text
        })
}

/// Color tokens: semantic, hex, no-fill and malformed
pub fn arb_color_token() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => prop_oneof![
            Just("primary"),
            Just("secondary"),
            Just("warning"),
            Just("critical"),
            Just("success"),
        ]
        .prop_map(String::from),
        2 => "#[0-9A-F]{6}",
        1 => prop_oneof![Just("clear"), Just("transparent")].prop_map(String::from),
        1 => "#[G-Z]{6}",
        1 => Just("{{statusColor}}".to_string()),
    ]
}

/// The stock palette with some named colors replaced
pub fn arb_palette() -> impl Strategy<Value = Palette> {
    let name = prop_oneof![Just("primary"), Just("warning"), Just("accent")];
    prop::collection::vec((name, any::<[u8; 3]>()), 0..3).prop_map(|overrides| {
        overrides
            .into_iter()
            .fold(Palette::default(), |palette, (name, [r, g, b])| {
                palette.with(name, Color::rgb(r, g, b))
            })
    })
}

/// Font tokens, a few of them invalid
pub fn arb_font_token() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => prop_oneof![
            Just("body"),
            Just("headline"),
            Just("caption"),
            Just("title2"),
            Just("subheadline.bold"),
        ]
        .prop_map(String::from),
        1 => Just("comicSans".to_string()),
    ]
}

/// Optional presentation attributes
fn arb_styled(component: Component) -> impl Strategy<Value = Component> {
    (
        prop::option::of(arb_font_token()),
        prop::option::of(arb_color_token()),
        prop::option::of(arb_color_token()),
        prop::option::of((0u8..24).prop_map(f64::from)),
    )
        .prop_map(move |(font, foreground, background, padding)| {
            let mut component = component.clone();
            component.font = font;
            component.foreground_color = foreground;
            component.background_color = background;
            component.padding = padding;
            component
        })
}

/// Leaf components
pub fn arb_leaf() -> impl Strategy<Value = Component> {
    let unstyled = prop_oneof![
        4 => (arb_id(), arb_text()).prop_map(|(id, text)| Component::text(id, text)),
        3 => (arb_id(), arb_item_key()).prop_map(|(id, key)| Component::bound_text(id, key)),
        2 => (arb_id(), "[A-Za-z ]{1,10}", prop_oneof![Just("startJob"), Just("callCustomer")])
            .prop_map(|(id, label, action)| Component::button(id, label, action)),
        1 => (arb_id(), "[a-z.]{1,12}").prop_map(|(id, name)| Component::image(id, name)),
        1 => arb_id().prop_map(Component::spacer),
        1 => arb_id().prop_map(Component::divider),
    ];
    unstyled.prop_flat_map(arb_styled)
}

/// Recursive component trees with bounded depth
pub fn arb_component() -> impl Strategy<Value = Component> {
    arb_leaf().prop_recursive(
        4,  // max depth
        48, // max size
        5,  // items per collection
        |inner| {
            prop_oneof![
                3 => (arb_id(), prop::collection::vec(inner.clone(), 0..5))
                    .prop_map(|(id, children)| Component::vstack(id, children)),
                2 => (arb_id(), prop::collection::vec(inner.clone(), 0..4), prop::option::of(0u8..16))
                    .prop_map(|(id, children, spacing)| {
                        let stack = Component::hstack(id, children);
                        match spacing {
                            Some(spacing) => stack.spacing(f64::from(spacing)),
                            None => stack,
                        }
                    }),
                1 => (arb_id(), prop::collection::vec(inner.clone(), 0..3))
                    .prop_map(|(id, children)| Component::scroll(id, children)),
                2 => (arb_id(), prop_oneof![arb_context_path(), arb_item_key()], prop::collection::vec(inner.clone(), 0..3))
                    .prop_map(|(id, key, children)| Component::conditional(id, key, children)),
                2 => (arb_id(), prop_oneof![Just("jobs"), Just("stops")], inner.clone())
                    .prop_map(|(id, collection, template)| Component::list(id, collection, template)),
                1 => (arb_id(), prop::collection::vec(inner, 0..3))
                    .prop_map(|(id, rows)| Component::unrolled_list(id, rows)),
            ]
        },
    )
}

/// Screens at any plausible version
pub fn arb_screen() -> impl Strategy<Value = Screen> {
    (0u32..4, arb_component()).prop_map(|(version, component)| Screen::new(version, component))
}

/// One job as bound into a list row
pub fn arb_job() -> impl Strategy<Value = Value> {
    (
        "[A-Z][a-z]{1,10}",
        prop::option::of("[0-9]{1,4} [A-Z][a-z]{2,8} St"),
        any::<bool>(),
        prop::option::of(prop_oneof![Just("8-10am"), Just("1-3pm")]),
        prop::option::of(prop_oneof![Just("success"), Just("warning"), Just("#GG0000")]),
    )
        .prop_map(|(customer, address, urgent, window, status_color)| {
            let mut job = json!({ "customerName": customer, "urgent": urgent });
            if let Some(address) = address {
                job["address"] = json!(address);
            }
            if let Some(window) = window {
                job["window"] = json!(window);
            }
            if let Some(color) = status_color {
                job["statusColor"] = json!(color);
            }
            job
        })
}

pub fn arb_jobs() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(arb_job(), 0..6)
}

/// Context snapshots with partially missing personalization
pub fn arb_context() -> impl Strategy<Value = RenderContext> {
    (
        arb_jobs(),
        prop::option::of("[A-Z][a-z]{2,8}"),
        prop::option::of(prop_oneof![Just("Sunny"), Just("Rain"), Just("")]),
        prop::option::of(0u32..20),
    )
        .prop_map(|(jobs, name, weather, pending)| {
            let stops = jobs
                .iter()
                .map(|job| json!({ "customerName": job["customerName"], "tasks": [] }))
                .collect();
            let mut builder = RenderContext::builder()
                .collection("jobs", jobs)
                .collection("stops", stops)
                .action("startJob", handler_fn(|_| async { Ok(()) }));
            if let Some(name) = name {
                builder = builder.value("user.name", json!(name));
            }
            if let Some(weather) = weather {
                builder = builder.value("weather.summary", json!(weather));
            }
            if let Some(pending) = pending {
                builder = builder.value("sync.pendingCount", json!(pending));
            }
            builder.build()
        })
}

/// Values that must omit a conditional
pub fn arb_falsy() -> impl Strategy<Value = Option<Value>> {
    prop_oneof![
        Just(None),
        Just(Some(Value::Null)),
        Just(Some(json!(""))),
        Just(Some(json!(0))),
        Just(Some(json!(0.0))),
        Just(Some(json!(false))),
    ]
}

/// Whether a subtree contains a component of `kind`
pub fn contains_kind(component: &Component, kind: ComponentKind) -> bool {
    component.kind == kind
        || component
            .children
            .iter()
            .chain(component.item_view.as_deref())
            .any(|child| contains_kind(child, kind))
}
