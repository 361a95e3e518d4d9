//! End-to-end scenarios across the context, queues, engines, and binding
//! layer.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use drift_animation::{
    shared_sink, AnimValue, AnimationContext, Color, Ease, Engine, Property, PropertySink,
    SharedSink, SlotStore, SpringParams, TweenParams, Vec2, Vec3, WobbleParams,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// A 2D node: rect position and scale, scalar rotation, RGBA color.
#[derive(Default)]
struct Node2D {
    position: Vec2,
    rotation: f32,
    scale: Vec2,
    color: Color,
}

impl PropertySink for Node2D {
    fn read(&self, property: Property) -> Option<AnimValue> {
        match property {
            Property::Position => Some(AnimValue::Pair(self.position)),
            Property::Rotation => Some(AnimValue::Scalar(self.rotation)),
            Property::Scale => Some(AnimValue::Pair(self.scale)),
            Property::Color => Some(AnimValue::Quad(self.color)),
        }
    }

    fn write(&mut self, property: Property, value: AnimValue) {
        match (property, value) {
            (Property::Position, AnimValue::Pair(v)) => self.position = v,
            (Property::Rotation, AnimValue::Scalar(v)) => self.rotation = v,
            (Property::Scale, AnimValue::Pair(v)) => self.scale = v,
            (Property::Color, AnimValue::Quad(v)) => self.color = v,
            _ => {}
        }
    }
}

/// A 3D node: only a translation.
#[derive(Default)]
struct Node3D {
    translation: Vec3,
}

impl PropertySink for Node3D {
    fn read(&self, property: Property) -> Option<AnimValue> {
        match property {
            Property::Position => Some(AnimValue::Triple(self.translation)),
            _ => None,
        }
    }

    fn write(&mut self, property: Property, value: AnimValue) {
        if let (Property::Position, AnimValue::Triple(v)) = (property, value) {
            self.translation = v;
        }
    }
}

fn position_of(sink: &SharedSink) -> Vec2 {
    match sink.lock().unwrap().read(Property::Position) {
        Some(AnimValue::Pair(v)) => v,
        other => panic!("unexpected position value {other:?}"),
    }
}

#[test]
fn tween_drives_node_position_to_exact_target() {
    init_tracing();
    let ctx = AnimationContext::new();
    let node = shared_sink(Node2D::default());

    let handle = ctx
        .tween(
            &node,
            Property::Position,
            Vec2::new(10.0, -20.0),
            TweenParams::new(1.0),
        )
        .unwrap();

    for i in 1..=10 {
        ctx.tick(0.1);
        let p = position_of(&node);
        assert!(
            (p.x - i as f32).abs() < 1e-3,
            "tick {i}: x was {}",
            p.x
        );
    }
    assert!(handle.is_complete());
    assert_eq!(position_of(&node), Vec2::new(10.0, -20.0));
    // The binding is released once the tween lands.
    ctx.tick(0.1);
    assert!(!ctx.is_animating(&node, Property::Position));
    assert_eq!(ctx.tween_count(), 0);
}

#[test]
fn replacement_cancels_prior_animation_silently() {
    init_tracing();
    let ctx = AnimationContext::new();
    let node = shared_sink(Node2D::default());
    let first_completions = Arc::new(AtomicUsize::new(0));
    let second_completions = Arc::new(AtomicUsize::new(0));

    {
        let fired = first_completions.clone();
        ctx.tween(
            &node,
            Property::Position,
            Vec2::new(100.0, 0.0),
            TweenParams::new(0.5),
        )
        .unwrap()
        .on_complete(move || {
            fired.fetch_add(1, Ordering::SeqCst);
        });
    }
    ctx.tick(0.1);

    {
        let fired = second_completions.clone();
        ctx.tween(
            &node,
            Property::Position,
            Vec2::new(-50.0, 0.0),
            TweenParams::new(0.2),
        )
        .unwrap()
        .on_complete(move || {
            fired.fetch_add(1, Ordering::SeqCst);
        });
    }
    assert_eq!(ctx.animated_property_count(&node), 1);

    for _ in 0..20 {
        ctx.tick(0.1);
    }
    assert_eq!(first_completions.load(Ordering::SeqCst), 0);
    assert_eq!(second_completions.load(Ordering::SeqCst), 1);
    assert_eq!(position_of(&node), Vec2::new(-50.0, 0.0));
}

#[test]
fn replacement_from_inside_a_completion_callback_is_safe() {
    init_tracing();
    let ctx = Arc::new(AnimationContext::new());
    let node = shared_sink(Node2D::default());

    {
        let ctx2 = ctx.clone();
        let node2 = node.clone();
        ctx.tween(
            &node,
            Property::Position,
            Vec2::new(10.0, 0.0),
            TweenParams::new(0.1),
        )
        .unwrap()
        .then(move || {
            ctx2.tween(
                &node2,
                Property::Position,
                Vec2::new(20.0, 0.0),
                TweenParams::new(0.1),
            )
            .unwrap();
        });
    }

    for _ in 0..10 {
        ctx.tick(0.05);
    }
    assert_eq!(position_of(&node), Vec2::new(20.0, 0.0));
}

#[test]
fn spring_converges_exactly_through_the_binding() {
    init_tracing();
    let ctx = AnimationContext::new();
    let node = shared_sink(Node2D::default());

    let handle = ctx
        .spring(
            &node,
            Property::Rotation,
            100.0f32,
            SpringParams::new(250.0, 10.0),
        )
        .unwrap();

    let mut ticks = 0;
    while !handle.is_complete() {
        ctx.tick(1.0 / 60.0);
        ticks += 1;
        assert!(ticks < 5_000, "spring never converged");
    }
    let rotation = match node.lock().unwrap().read(Property::Rotation) {
        Some(AnimValue::Scalar(v)) => v,
        other => panic!("unexpected rotation {other:?}"),
    };
    assert_eq!(rotation, 100.0);
}

#[test]
fn spring_retarget_restarts_a_finished_spring() {
    init_tracing();
    let ctx = AnimationContext::new();
    let store = SlotStore::from_components(&[0.0]);
    let handle = ctx.spawn_spring(Engine::spring(&store, &[10.0], SpringParams::default()));
    handle.start();
    for _ in 0..2_000 {
        ctx.tick(1.0 / 60.0);
        if handle.is_complete() {
            break;
        }
    }
    assert!(handle.is_complete());
    assert_eq!(store.snapshot()[0], 10.0);

    handle.to(25.0f32);
    assert!(handle.is_running());
    for _ in 0..2_000 {
        ctx.tick(1.0 / 60.0);
        if handle.is_complete() {
            break;
        }
    }
    assert_eq!(store.snapshot()[0], 25.0);
}

#[test]
fn dropping_the_node_ends_its_animations() {
    init_tracing();
    let ctx = AnimationContext::new();
    let node = shared_sink(Node2D::default());

    ctx.tween(
        &node,
        Property::Position,
        Vec2::new(100.0, 100.0),
        TweenParams::new(10.0),
    )
    .unwrap();
    ctx.tick(0.016);
    assert_eq!(ctx.tween_count(), 1);

    drop(node);
    // First pass notices the dead sink and unbinds; the engine's store dies
    // with the handler and the engine cancels itself.
    ctx.tick(0.016);
    ctx.tick(0.016);
    ctx.tick(0.016);
    assert_eq!(ctx.tween_count(), 0);
}

#[test]
fn kind_mismatch_and_missing_property_are_rejected() {
    init_tracing();
    let ctx = AnimationContext::new();
    let node = shared_sink(Node3D::default());

    // 3D position wants a Triple.
    assert!(ctx
        .tween(
            &node,
            Property::Position,
            Vec2::new(1.0, 2.0),
            TweenParams::default(),
        )
        .is_err());
    assert!(ctx
        .tween(&node, Property::Color, Color::RED, TweenParams::default())
        .is_err());

    // And the right shape binds fine.
    assert!(ctx
        .tween(
            &node,
            Property::Position,
            Vec3::new(1.0, 2.0, 3.0),
            TweenParams::default(),
        )
        .is_ok());
}

#[test]
fn chained_animation_starts_on_the_following_tick() {
    init_tracing();
    let ctx = Arc::new(AnimationContext::new());
    let store = SlotStore::from_components(&[0.0]);
    let follow = ctx.spawn_tween(Engine::tween(&store, &[5.0], TweenParams::new(0.2)));

    let lead_store = SlotStore::from_components(&[0.0]);
    let lead = ctx.spawn_tween(Engine::tween(&lead_store, &[1.0], TweenParams::new(0.1)));
    let lead = lead.follow_with(&follow);
    lead.start();

    // Lead completes on this tick; the follower was enqueued mid-pass and
    // must not have stepped yet.
    ctx.tick(0.1);
    assert!(lead.is_complete());
    assert_eq!(store.snapshot()[0], 0.0);

    ctx.tick(0.1);
    assert!(store.snapshot()[0] > 0.0);
}

#[test]
fn animation_enqueued_mid_tick_first_runs_on_the_next_tick() {
    init_tracing();
    let ctx = Arc::new(AnimationContext::new());
    let spring_store = SlotStore::from_components(&[0.0]);
    let spring = ctx.spawn_spring(Engine::spring(
        &spring_store,
        &[10.0],
        SpringParams::default(),
    ));

    let lead_store = SlotStore::from_components(&[0.0]);
    let lead = ctx.spawn_tween(Engine::tween(&lead_store, &[1.0], TweenParams::new(0.05)));
    let lead = lead.follow_with(&spring);
    lead.start();

    // The tween completes this tick. The spring queue runs later in the
    // same tick, but the spring it enqueued must not step until the next.
    ctx.tick(0.1);
    assert!(lead.is_complete());
    assert_eq!(spring_store.snapshot()[0], 0.0);

    ctx.tick(0.1);
    assert!(spring_store.snapshot()[0] > 0.0);
}

#[test]
fn wobble_on_a_color_returns_to_the_original() {
    init_tracing();
    let ctx = AnimationContext::new();
    let node = shared_sink(Node2D {
        color: Color::rgba(0.2, 0.4, 0.6, 1.0),
        ..Node2D::default()
    });

    let handle = ctx
        .wobble(
            &node,
            Property::Color,
            WobbleParams::new(12.0, 0.1)
                .with_duration(0.3)
                .with_ease_out(TweenParams::new(0.1).with_easing(Ease::QuadOut)),
        )
        .unwrap();

    let mut ticks = 0;
    while !handle.is_complete() {
        ctx.tick(1.0 / 60.0);
        ticks += 1;
        assert!(ticks < 1_000, "wobble never completed");
    }
    let color = match node.lock().unwrap().read(Property::Color) {
        Some(AnimValue::Quad(c)) => c,
        other => panic!("unexpected color {other:?}"),
    };
    assert_eq!(color, Color::rgba(0.2, 0.4, 0.6, 1.0));
}

#[test]
fn delayed_tween_waits_before_moving() {
    init_tracing();
    let ctx = AnimationContext::new();
    let node = shared_sink(Node2D::default());

    ctx.tween(
        &node,
        Property::Position,
        Vec2::new(10.0, 0.0),
        TweenParams::new(0.2).with_delay(0.3),
    )
    .unwrap();

    for _ in 0..3 {
        ctx.tick(0.09);
    }
    assert_eq!(position_of(&node), Vec2::ZERO);
    for _ in 0..10 {
        ctx.tick(0.09);
    }
    assert_eq!(position_of(&node), Vec2::new(10.0, 0.0));
}

#[test]
fn timers_fire_in_context_order_before_engines() {
    init_tracing();
    let ctx = Arc::new(AnimationContext::new());
    let order = Arc::new(std::sync::Mutex::new(Vec::new()));

    {
        let order = order.clone();
        ctx.delay(0.05, move || order.lock().unwrap().push("timer"));
    }
    let store = SlotStore::from_components(&[0.0]);
    let tween = ctx.spawn_tween(Engine::tween(&store, &[1.0], TweenParams::new(0.05)));
    {
        let order = order.clone();
        tween
            .on_complete(move || order.lock().unwrap().push("tween"))
            .start();
    }

    ctx.tick(0.1);
    assert_eq!(*order.lock().unwrap(), vec!["timer", "tween"]);
}

#[test]
fn cancel_all_releases_every_binding() {
    init_tracing();
    let ctx = AnimationContext::new();
    let node = shared_sink(Node2D::default());

    ctx.tween(
        &node,
        Property::Position,
        Vec2::new(5.0, 5.0),
        TweenParams::new(1.0),
    )
    .unwrap();
    ctx.spring(&node, Property::Rotation, 90.0f32, SpringParams::stiff())
        .unwrap();
    assert_eq!(ctx.animated_property_count(&node), 2);

    ctx.cancel_all(&node);
    assert_eq!(ctx.animated_property_count(&node), 0);
    // Torn-down engines leave their queues on the next pass without
    // touching the node again.
    let before = position_of(&node);
    ctx.tick(0.1);
    ctx.tick(0.1);
    assert_eq!(position_of(&node), before);
    assert_eq!(ctx.tween_count(), 0);
    assert_eq!(ctx.spring_count(), 0);
}

#[test]
fn params_deserialize_from_host_config() {
    init_tracing();
    let tween: TweenParams =
        serde_json::from_str(r#"{ "duration": 0.75, "easing": "BounceOut" }"#).unwrap();
    assert_eq!(tween.duration, 0.75);
    assert_eq!(tween.delay, 0.0);
    assert_eq!(tween.easing, Ease::BounceOut);

    let wobble: WobbleParams = serde_json::from_str(
        r#"{ "frequency": 6.0, "amplitude": 2.5, "ease_in": { "duration": 0.1 } }"#,
    )
    .unwrap();
    assert_eq!(wobble.frequency, 6.0);
    assert_eq!(wobble.ease_in.unwrap().duration, 0.1);
    assert!(wobble.ease_out.is_none());
}
