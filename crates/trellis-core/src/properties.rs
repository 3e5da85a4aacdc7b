//! Property tests for the interpreter

use crate::binder::{Binder, RenderOutput};
use crate::cache::ViewCache;
use crate::context::RenderContext;
use crate::model::{Component, Screen, DEFAULT_MAX_DEPTH};
use crate::proptest_strategies::*;
use crate::style::{Color, Palette, StyleResolver};
use crate::version::VersionGate;
use proptest::prelude::*;
use serde_json::json;

fn render(screen: &Screen, context: &RenderContext, cache: Option<&ViewCache>) -> RenderOutput {
    render_with(screen, context, &StyleResolver::default(), cache)
}

fn render_with(
    screen: &Screen,
    context: &RenderContext,
    styles: &StyleResolver,
    cache: Option<&ViewCache>,
) -> RenderOutput {
    let gate = VersionGate::new(u32::MAX);
    let admitted = gate.admit(screen).expect("gate admits every version");
    let binder = Binder::new(context, styles);
    match cache {
        Some(cache) => binder.with_cache(cache).render(&admitted),
        None => binder.render(&admitted),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_render_terminates_within_depth(screen in arb_screen(), context in arb_context()) {
        let output = render(&screen, &context, None);
        if let Some(root) = &output.root {
            prop_assert_eq!(&root.id, &screen.component.id);
        }
        prop_assert!(screen.depth() <= DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn prop_wire_round_trip(screen in arb_screen()) {
        let encoded = screen.to_json().unwrap();
        let decoded = Screen::from_json(&encoded).unwrap();
        prop_assert_eq!(decoded, screen);
    }

    #[test]
    fn prop_render_is_idempotent(screen in arb_screen(), context in arb_context()) {
        prop_assert_eq!(render(&screen, &context, None), render(&screen, &context, None));
    }

    #[test]
    fn prop_cache_does_not_change_output(
        screen in arb_screen(),
        context in arb_context(),
        palette in arb_palette(),
    ) {
        let cache = ViewCache::new(64);
        let styles = StyleResolver::new(palette);
        let stock = render(&screen, &context, Some(&cache));
        prop_assert_eq!(&stock, &render(&screen, &context, None));

        let uncached = render_with(&screen, &context, &styles, None);
        let cold = render_with(&screen, &context, &styles, Some(&cache));
        let warm = render_with(&screen, &context, &styles, Some(&cache));
        prop_assert_eq!(&cold, &uncached);
        prop_assert_eq!(&warm, &uncached);
    }

    #[test]
    fn prop_cache_tracks_palette_changes(screen in arb_screen(), context in arb_context()) {
        let cache = ViewCache::new(64);
        render(&screen, &context, Some(&cache));
        let styles = StyleResolver::new(Palette::default().with("primary", Color::rgb(0x01, 0x02, 0x03)));
        prop_assert_eq!(
            render_with(&screen, &context, &styles, Some(&cache)),
            render_with(&screen, &context, &styles, None)
        );
    }

    #[test]
    fn prop_cache_tracks_context_changes(
        screen in arb_screen(),
        first in arb_context(),
        second in arb_context(),
    ) {
        let cache = ViewCache::new(16);
        render(&screen, &first, Some(&cache));
        prop_assert_eq!(render(&screen, &second, Some(&cache)), render(&screen, &second, None));
    }

    #[test]
    fn prop_list_yields_one_row_per_item(jobs in arb_jobs()) {
        let template = Component::vstack("row", vec![Component::bound_text("name", "customerName")]);
        let screen = Screen::new(1, Component::list("jobs", "jobs", template));
        let context = RenderContext::builder().collection("jobs", jobs.clone()).build();
        let output = render(&screen, &context, None);

        let rows = output.find("jobs").unwrap().children();
        prop_assert_eq!(rows.len(), jobs.len());
        let expected: Vec<&str> = jobs.iter().map(|job| job["customerName"].as_str().unwrap()).collect();
        prop_assert_eq!(output.texts(), expected);
    }

    #[test]
    fn prop_falsy_conditionals_are_absent(value in arb_falsy(), children in prop::collection::vec(arb_leaf(), 0..4)) {
        let screen = Screen::new(
            1,
            Component::vstack("root", vec![Component::conditional("gate", "flag", children)]),
        );
        let mut builder = RenderContext::builder();
        if let Some(value) = value {
            builder = builder.value("flag", value);
        }
        let output = render(&screen, &builder.build(), None);
        prop_assert!(output.find("gate").is_none());
        prop_assert!(output.find("root").unwrap().children().is_empty());
    }

    #[test]
    fn prop_malformed_hex_falls_back_to_primary(digits in "[G-Zg-z]{6}") {
        let context = RenderContext::builder().build();
        let styles = StyleResolver::default();
        let scope = crate::context::Scope::top(&context);
        prop_assert_eq!(styles.resolve_color(&format!("#{digits}"), &scope), styles.primary());
    }

    #[test]
    fn prop_no_fill_literals_agree(upper in any::<bool>()) {
        let context = RenderContext::builder().build();
        let styles = StyleResolver::default();
        let scope = crate::context::Scope::top(&context);
        let (transparent, clear) = if upper { ("TRANSPARENT", "CLEAR") } else { ("transparent", "clear") };
        prop_assert_eq!(styles.resolve_color(transparent, &scope), styles.resolve_color(clear, &scope));
        prop_assert_eq!(styles.resolve_color(clear, &scope), Color::Clear);
    }

    #[test]
    fn prop_version_gate_boundary(max in 1u32..1000) {
        let gate = VersionGate::new(max);
        let at_max = Screen::new(max, Component::text("t", "x"));
        let above = Screen::new(max + 1, Component::text("t", "x"));
        prop_assert!(gate.admit(&at_max).is_ok());
        prop_assert!(gate.admit(&above).is_err());
    }

    #[test]
    fn prop_tokens_resolve_against_context(name in "[A-Z][a-z]{1,10}") {
        let screen = Screen::new(1, Component::text("greeting", "Good day, {{user.name}}"));
        let context = RenderContext::builder().value("user.name", json!(name.clone())).build();
        let output = render(&screen, &context, None);
        let expected = format!("Good day, {name}");
        prop_assert_eq!(output.texts(), vec![expected.as_str()]);
    }
}
