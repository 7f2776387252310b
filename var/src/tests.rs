use crate::*;

use crate::listeners::Listeners;
use std::boxed::Box;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::vec;
use std::vec::Vec;

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        debug_assert!(start < end_exclusive);
        start + (self.next_u64() % (end_exclusive - start) as u64) as usize
    }

    fn gen_bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

fn recorder<T: Clone + 'static>() -> (Rc<RefCell<Vec<T>>>, impl Fn(&T, &T) + 'static) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = {
        let seen = Rc::clone(&seen);
        move |v: &T, _: &T| seen.borrow_mut().push(v.clone())
    };
    (seen, sink)
}

fn manual() -> (Rc<ManualScheduler>, Rc<dyn Scheduler>) {
    let sched = Rc::new(ManualScheduler::new());
    let dyn_sched: Rc<dyn Scheduler> = sched.clone();
    (sched, dyn_sched)
}

#[derive(Clone, Debug, PartialEq)]
struct Pair {
    left: i32,
    right: i32,
}

#[test]
fn equal_write_fires_nothing() {
    let a = Var::new(5);
    let calls = Rc::new(RefCell::new(0));
    let bump = |calls: &Rc<RefCell<i32>>| {
        let calls = Rc::clone(calls);
        move |_: &i32, _: &i32| *calls.borrow_mut() += 1
    };
    let _up = a.listen_up(bump(&calls));
    let _down = a.listen_down(bump(&calls));
    let _fx = a.effect(bump(&calls));

    a.set(5);
    assert_eq!(*calls.borrow(), 0);
    a.modify(|v| *v);
    assert_eq!(*calls.borrow(), 0);

    a.set(6);
    assert_eq!(*calls.borrow(), 3);
}

#[test]
fn propagation_runs_up_then_down_then_effects() {
    let a = Var::new(0);
    let log = Rc::new(RefCell::new(Vec::new()));
    let push = |tag: &'static str| {
        let log = Rc::clone(&log);
        move |new: &i32, old: &i32| log.borrow_mut().push((tag, *new, *old))
    };
    // Registered in reverse order on purpose: ordering is by channel first.
    let _fx = a.effect(push("effect"));
    let _down = a.listen_down(push("down"));
    let _up = a.listen_up(push("up"));

    a.set(1);
    assert_eq!(
        *log.borrow(),
        vec![("up", 1, 0), ("down", 1, 0), ("effect", 1, 0)]
    );
}

#[test]
fn listeners_fire_in_registration_order() {
    let a = Var::new(0);
    let (seen, _) = recorder::<usize>();
    let mut handles = Vec::new();
    for i in 0..5usize {
        let seen = Rc::clone(&seen);
        handles.push(a.effect(move |_, _| seen.borrow_mut().push(i)));
    }
    // Remove the second listener and register another: the newcomer still runs last.
    handles.remove(1).uninstall();
    {
        let seen = Rc::clone(&seen);
        handles.push(a.effect(move |_, _| seen.borrow_mut().push(99)));
    }

    a.set(1);
    assert_eq!(*seen.borrow(), vec![0, 2, 3, 4, 99]);
}

#[test]
fn nested_write_during_propagation_is_dropped() {
    let a = Var::new(0);
    let inner = a.clone();
    let listener = a.listen_down(move |v, _| {
        if *v == 1 {
            inner.set(99);
        }
    });
    let (seen, sink) = recorder::<i32>();
    let _fx = a.effect(sink);

    a.set(1);
    assert_eq!(a.get(), 1);
    assert_eq!(*seen.borrow(), vec![1]);
    assert!(!a.is_busy());

    // Writes outside the cascade go through again.
    a.set(2);
    assert_eq!(a.get(), 2);
    listener.uninstall();
}

#[test]
fn effect_writing_back_into_its_source_is_dropped() {
    let a = Var::new(1);
    let doubled = a.map(|v| v * 2);
    let writer = a.clone();
    let _fx = doubled.effect(move |v, _| writer.set(*v));

    a.set(3);
    assert_eq!(a.get(), 3);
    assert_eq!(doubled.get(), 6);
}

#[test]
fn zoom_is_a_lens_over_its_source() {
    let pair = Var::new(Pair { left: 1, right: 2 });
    let left = pair.zoom(|p| p.left, |left, p| Pair { left, ..p.clone() });

    for x in [10, -4, 0, 7] {
        left.set(x);
        assert_eq!(left.get(), x);
        assert_eq!(pair.get(), Pair { left: x, right: 2 });
    }

    pair.set(Pair { left: 5, right: 9 });
    assert_eq!(left.get(), 5);
}

#[test]
fn installed_zoom_propagates_both_ways_once() {
    let pair = Var::new(Pair { left: 1, right: 2 });
    let left = pair.zoom(|p| p.left, |left, p| Pair { left, ..p.clone() });
    let (seen, sink) = recorder::<i32>();
    let _fx = left.effect(sink);
    let (pairs, pair_sink) = recorder::<Pair>();
    let _pfx = pair.effect(pair_sink);

    pair.set(Pair { left: 7, right: 2 });
    left.set(8);
    // Changing the other field does not touch the lens.
    pair.modify(|p| Pair {
        right: 30,
        ..p.clone()
    });

    assert_eq!(*seen.borrow(), vec![7, 8]);
    assert_eq!(
        *pairs.borrow(),
        vec![
            Pair { left: 7, right: 2 },
            Pair { left: 8, right: 2 },
            Pair { left: 8, right: 30 },
        ]
    );
}

#[test]
fn lens_write_compares_against_the_source_value() {
    let src = Var::new(0);
    let view = src.zoom(|v: &i32| *v, |v: i32, _: &i32| v);
    let redirected = Rc::new(Cell::new(false));
    let (seen, sink) = recorder::<i32>();
    let _rec = view.effect(sink);
    let _fx = {
        let src = src.clone();
        let redirected = Rc::clone(&redirected);
        view.effect(move |v: &i32, _| {
            if *v == 1 && !redirected.replace(true) {
                src.set(5);
            }
        })
    };

    // The lens is busy while its own effect moves the source, so it misses that update.
    view.set(1);
    assert_eq!(src.get(), 5);
    assert_eq!(view.get(), 5);

    view.set(1);
    assert_eq!(src.get(), 1);
    assert_eq!(view.get(), 1);
    assert_eq!(*seen.borrow(), vec![1, 1]);
}

#[test]
fn prop_at_and_iso_are_zoom_specialisations() {
    let pair = Var::new(Pair { left: 1, right: 2 });
    let right = pair.prop(|p| &p.right, |p| &mut p.right);
    right.set(20);
    assert_eq!(pair.get(), Pair { left: 1, right: 20 });

    let items = Var::new(vec![1, 2, 3]);
    let second = items.at(1);
    assert_eq!(second.get(), Some(2));
    second.set(Some(20));
    assert_eq!(items.get(), vec![1, 20, 3]);
    second.set(None);
    assert_eq!(items.get(), vec![1, 20, 3]);

    let past_end = items.at(5);
    assert_eq!(past_end.get(), None);
    past_end.set(Some(1));
    assert_eq!(items.get(), vec![1, 20, 3]);

    let tens = Var::new(2);
    let units = tens.iso(|t| t * 10, |u| u / 10);
    assert_eq!(units.get(), 20);
    units.set(50);
    assert_eq!(tens.get(), 5);
}

#[test]
fn map_does_not_subscribe_without_consumers() {
    let a = Var::new(1);
    let doubled = a.map(|v| v * 2);
    assert_eq!(a.downstream_count(), 0);
    assert_eq!(doubled.get(), 2);

    a.set(2);
    assert_eq!(doubled.get(), 4);
    assert_eq!(a.downstream_count(), 0);
    assert!(!doubled.is_installed());

    let fx = doubled.effect(|_, _| {});
    assert_eq!(a.downstream_count(), 1);
    assert!(doubled.is_installed());

    fx.uninstall();
    assert_eq!(a.downstream_count(), 0);
    assert!(!doubled.is_installed());
}

#[test]
fn last_consumer_tears_down_the_whole_chain() {
    let a = Var::new(1);
    let m1 = a.map(|v| v + 1);
    let m2 = m1.map(|v| v * 10);

    let e1 = m2.effect(|_, _| {});
    let e2 = m2.effect(|_, _| {});
    assert_eq!(a.downstream_count(), 1);
    assert_eq!(m1.downstream_count(), 1);
    assert_eq!(m2.consumer_count(), 2);

    drop(e1);
    assert_eq!(a.downstream_count(), 1);
    assert!(m1.is_installed());

    drop(e2);
    assert_eq!(a.downstream_count(), 0);
    assert_eq!(m1.downstream_count(), 0);
    assert!(!m1.is_installed());
    assert!(!m2.is_installed());

    a.set(5);
    assert_eq!(m2.get(), 60);
}

#[test]
fn derived_cell_lives_as_long_as_its_consumers() {
    let a = Var::new(1);
    let (seen, sink) = recorder::<i32>();
    let fx = {
        let doubled = a.map(|v| v * 2);
        doubled.effect(sink)
    };

    a.set(2);
    assert_eq!(*seen.borrow(), vec![4]);

    drop(fx);
    assert_eq!(a.downstream_count(), 0);
    a.set(3);
    assert_eq!(*seen.borrow(), vec![4]);
}

#[test]
fn detached_subscription_stays_installed() {
    let a = Var::new(1);
    let m = a.map(|v| v + 1);
    m.effect(|_, _| {}).detach();
    assert!(m.is_installed());
    assert_eq!(a.downstream_count(), 1);
}

#[test]
fn listener_removed_mid_cascade_is_skipped() {
    let a = Var::new(0);
    let log = Rc::new(RefCell::new(Vec::new()));
    let second: Rc<RefCell<Option<Uninstaller>>> = Rc::new(RefCell::new(None));

    let _first = {
        let log = Rc::clone(&log);
        let second = Rc::clone(&second);
        a.effect(move |_, _| {
            log.borrow_mut().push("first");
            let handle = second.borrow_mut().take();
            drop(handle);
        })
    };
    let handle = {
        let log = Rc::clone(&log);
        a.effect(move |_, _| log.borrow_mut().push("second"))
    };
    *second.borrow_mut() = Some(handle);

    a.set(1);
    assert_eq!(*log.borrow(), vec!["first"]);
    assert_eq!(a.effect_count(), 1);
}

#[test]
fn listener_added_mid_cascade_waits_for_next_write() {
    let a = Var::new(0);
    let (seen, _) = recorder::<i32>();
    let late: Rc<RefCell<Vec<Uninstaller>>> = Rc::new(RefCell::new(Vec::new()));
    let _fx = {
        let a2 = a.clone();
        let seen = Rc::clone(&seen);
        let late = Rc::clone(&late);
        a.effect(move |_, _| {
            if late.borrow().is_empty() {
                let seen = Rc::clone(&seen);
                let handle = a2.effect(move |v, _| seen.borrow_mut().push(*v));
                late.borrow_mut().push(handle);
            }
        })
    };

    a.set(1);
    assert!(seen.borrow().is_empty());
    a.set(2);
    assert_eq!(*seen.borrow(), vec![2]);
    late.borrow_mut().clear();
}

#[test]
fn effect_now_runs_immediately() {
    let a = Var::new(3);
    let (seen, sink) = recorder::<i32>();
    let _fx = a.effect_now(sink);
    assert_eq!(*seen.borrow(), vec![3]);
    a.set(4);
    assert_eq!(*seen.borrow(), vec![3, 4]);
}

#[test]
fn custom_equality_controls_propagation() {
    let shared = Rc::new(vec![1, 2]);
    let handle = Var::with_eq(Rc::clone(&shared), eq::rc_ptr());
    let calls = Rc::new(RefCell::new(0));
    let _fx = {
        let calls = Rc::clone(&calls);
        handle.effect(move |_, _| *calls.borrow_mut() += 1)
    };

    handle.set(Rc::clone(&shared));
    assert_eq!(*calls.borrow(), 0);
    handle.set(Rc::new(vec![1, 2]));
    assert_eq!(*calls.borrow(), 1);

    let always = Var::with_eq(0, eq::never());
    let (seen, sink) = recorder::<i32>();
    let _afx = always.effect(sink);
    always.set(0);
    always.set(0);
    assert_eq!(*seen.borrow(), vec![0, 0]);
}

#[test]
fn debounce_emits_last_value_after_quiet_period() {
    let (sched, s) = manual();
    let a = Var::new(0);
    let debounced = a.debounce(&s, 100);
    let (seen, sink) = recorder::<i32>();
    let _fx = debounced.effect(sink);

    a.set(1);
    sched.advance(30);
    a.set(2);
    sched.advance(30);
    a.set(3);
    sched.advance(99);
    assert!(seen.borrow().is_empty());
    assert_eq!(debounced.get(), 0);

    sched.advance(1);
    assert_eq!(*seen.borrow(), vec![3]);
    assert_eq!(debounced.get(), 3);
    assert_eq!(sched.pending_timers(), 0);
}

#[test]
fn debounce_takes_current_value_on_install() {
    let (_sched, s) = manual();
    let a = Var::new(1);
    let debounced = a.debounce(&s, 50);
    a.set(5);

    let _fx = debounced.effect(|_, _| {});
    assert_eq!(debounced.get(), 5);
}

#[test]
fn time_shaped_cells_read_their_source_while_detached() {
    let (sched, s) = manual();
    let a = Var::new(1);
    let debounced = a.debounce(&s, 100);
    let batched = a.batch(&s);
    a.set(2);
    assert_eq!(debounced.get(), 2);
    assert_eq!(batched.with(|v| *v), 2);

    let _fx = debounced.effect(|_, _| {});
    a.set(3);
    assert_eq!(debounced.get(), 2);
    sched.advance(100);
    assert_eq!(debounced.get(), 3);
}

#[test]
fn teardown_cancels_pending_timer() {
    let (sched, s) = manual();
    let a = Var::new(0);
    let debounced = a.debounce(&s, 100);
    let (seen, sink) = recorder::<i32>();
    let fx = debounced.effect(sink);

    a.set(1);
    assert_eq!(sched.pending_timers(), 1);
    drop(fx);
    assert_eq!(sched.pending_timers(), 0);
    assert_eq!(a.downstream_count(), 0);

    sched.advance(500);
    assert!(seen.borrow().is_empty());
}

#[test]
fn timer_outliving_its_cell_is_harmless() {
    let (sched, s) = manual();
    let a = Var::new(0);
    {
        let debounced = a.debounce(&s, 10);
        debounced.effect(|_, _| {}).detach();
        a.set(1);
    }
    sched.advance(10);
    assert_eq!(sched.pending_timers(), 0);
}

#[test]
fn throttle_passes_leading_edge_and_flushes_trailing_value() {
    let (sched, s) = manual();
    let a = Var::new(0);
    let throttled = a.throttle(&s, 100);
    let (seen, sink) = recorder::<i32>();
    let _fx = throttled.effect(sink);

    a.set(1);
    assert_eq!(*seen.borrow(), vec![1]);
    sched.advance(10);
    a.set(2);
    sched.advance(10);
    a.set(3);
    assert_eq!(*seen.borrow(), vec![1]);

    sched.advance(80);
    assert_eq!(*seen.borrow(), vec![1, 3]);

    // The flush opened a new window.
    sched.advance(50);
    a.set(4);
    assert_eq!(*seen.borrow(), vec![1, 3]);
    sched.advance(50);
    assert_eq!(*seen.borrow(), vec![1, 3, 4]);

    // A window with nothing held closes quietly.
    sched.advance(100);
    a.set(5);
    assert_eq!(*seen.borrow(), vec![1, 3, 4, 5]);
}

#[test]
fn batch_coalesces_writes_per_frame() {
    let (sched, s) = manual();
    let a = Var::new(0);
    let batched = a.batch(&s);
    let (seen, sink) = recorder::<i32>();
    let _fx = batched.effect(sink);

    a.set(1);
    a.set(2);
    a.set(3);
    assert!(seen.borrow().is_empty());
    assert_eq!(sched.pending_frames(), 1);

    assert_eq!(sched.run_frame(), 1);
    assert_eq!(*seen.borrow(), vec![3]);

    a.set(4);
    sched.run_frame();
    assert_eq!(*seen.borrow(), vec![3, 4]);
    assert_eq!(sched.run_frame(), 0);
}

#[test]
fn pack_round_trips_bidirectionally() {
    let a = Var::new(1);
    let b = Var::new(2);
    let packed = pack_bidirectional([("a", &a), ("b", &b)]);
    assert_eq!(packed.get(), BTreeMap::from([("a", 1), ("b", 2)]));

    packed.set(BTreeMap::from([("a", 10), ("b", 20)]));
    assert_eq!(a.get(), 10);
    assert_eq!(b.get(), 20);

    a.set(3);
    assert_eq!(packed.get()["a"], 3);

    // Unknown keys are ignored.
    packed.set(BTreeMap::from([("a", 4), ("z", 99)]));
    assert_eq!(a.get(), 4);
    assert_eq!(b.get(), 20);
}

#[test]
fn installed_pack_recomputes_on_any_input() {
    let a = Var::new(1);
    let b = Var::new(2);
    let packed = pack([("a", &a), ("b", &b)]);
    let (seen, sink) = recorder::<BTreeMap<&'static str, i32>>();
    let _fx = packed.effect(sink);

    b.set(5);
    a.set(4);
    assert_eq!(
        *seen.borrow(),
        vec![
            BTreeMap::from([("a", 1), ("b", 5)]),
            BTreeMap::from([("a", 4), ("b", 5)]),
        ]
    );
}

#[test]
fn list_tracks_inputs_and_writes_back() {
    let xs = [Var::new(1), Var::new(2), Var::new(3)];
    let listed = list(xs.iter());
    let (seen, sink) = recorder::<Vec<i32>>();
    let _fx = listed.effect(sink);

    xs[1].set(20);
    assert_eq!(*seen.borrow(), vec![vec![1, 20, 3]]);

    let synced = list_bidirectional(xs.iter());
    synced.set(vec![7, 8]);
    assert_eq!(xs[0].get(), 7);
    assert_eq!(xs[1].get(), 8);
    assert_eq!(xs[2].get(), 3);
    assert_eq!(listed.get(), vec![7, 8, 3]);
}

#[test]
fn lift_combines_heterogeneous_inputs() {
    let width = Var::new(3u32);
    let label = Var::new("w");
    let scale = Var::new(2.0f64);
    let flag = Var::new(true);

    let two = lift2(&width, &label, |w, l| std::format!("{l}={w}"));
    assert_eq!(two.get(), "w=3");

    let three = lift3(&width, &scale, &flag, |w, s, f| {
        if *f { *w as f64 * s } else { 0.0 }
    });
    let (seen, sink) = recorder::<f64>();
    let _fx = three.effect(sink);
    scale.set(3.0);
    flag.set(false);
    assert_eq!(*seen.borrow(), vec![9.0, 0.0]);

    let four = lift4(&width, &label, &scale, &flag, |w, l, s, f| (*w, *l, *s, *f));
    assert_eq!(four.get(), (3, "w", 3.0, false));
}

#[test]
fn diamond_recomputes_once_per_write() {
    let a = Var::new(1);
    let doubled = a.map(|v| v * 2);
    let sum = lift2(&a, &doubled, |x, y| x + y);
    let (seen, sink) = recorder::<i32>();
    let _fx = sum.effect(sink);

    a.set(2);
    a.set(3);
    assert_eq!(*seen.borrow(), vec![6, 9]);
}

#[test]
fn uninstaller_combinators() {
    let count = Rc::new(RefCell::new(0));
    let bump = || {
        let count = Rc::clone(&count);
        Uninstaller::new(move || *count.borrow_mut() += 1)
    };
    let all = Uninstaller::all([bump(), Uninstaller::noop(), bump()]);
    assert!(all.is_active());
    all.uninstall();
    assert_eq!(*count.borrow(), 2);

    let kept = bump();
    kept.detach();
    assert_eq!(*count.borrow(), 2);

    drop(bump());
    assert_eq!(*count.borrow(), 3);
}

#[test]
fn manual_scheduler_runs_timers_in_due_order() {
    let sched = ManualScheduler::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let at = |tag: &'static str| {
        let log = Rc::clone(&log);
        Box::new(move || log.borrow_mut().push(tag)) as Task
    };

    sched.after(30, at("c"));
    let cancelled = sched.after(20, at("x"));
    sched.after(10, at("a"));
    sched.after(10, at("b"));
    sched.cancel(cancelled);
    sched.next_frame(at("frame"));

    sched.advance(15);
    assert_eq!(*log.borrow(), vec!["a", "b"]);
    assert_eq!(sched.now(), 15);
    sched.advance(100);
    assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    assert_eq!(sched.run_frame(), 1);
    assert_eq!(*log.borrow(), vec!["a", "b", "c", "frame"]);
}

#[test]
fn listener_list_matches_reference_model() {
    let mut rng = Lcg::new(0x5eed);
    for _case in 0..50 {
        let mut list: Listeners<usize> = Listeners::new();
        let mut model: Vec<(usize, crate::listeners::ListenerKey)> = Vec::new();
        let mut stale = Vec::new();
        let mut next_id = 0usize;

        for _step in 0..200 {
            if model.is_empty() || rng.gen_bool() {
                let key = list.insert(Rc::new(next_id));
                model.push((next_id, key));
                next_id += 1;
            } else {
                let i = rng.gen_range_usize(0, model.len());
                let (_, key) = model.remove(i);
                assert!(list.remove(key));
                stale.push(key);
            }

            assert_eq!(list.len(), model.len());
            let live: Vec<usize> = list
                .snapshot()
                .into_iter()
                .filter_map(|k| list.get(k).map(|f| *f))
                .collect();
            let expected: Vec<usize> = model.iter().map(|(id, _)| *id).collect();
            assert_eq!(live, expected);
        }

        for key in stale {
            assert!(!list.remove(key));
            assert!(list.get(key).is_none());
        }
    }
}
