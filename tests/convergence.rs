//! Integration tests verifying replica convergence.
//!
//! Replicas mutate independently and exchange full state; merging in any
//! order must produce the same result.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::thread;

use lww_dict::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Lamport-style counter a replica uses to stamp its own writes.
#[derive(Default)]
struct Clock(u64);

impl Clock {
    fn tick(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    /// Advance past a timestamp observed from another replica.
    fn witness(&mut self, seen: u64) {
        self.0 = self.0.max(seen) + 1;
    }
}

fn k(s: &str) -> String {
    s.to_string()
}

fn export(pairs: &[(&str, &str)]) -> BTreeMap<String, Vec<u8>> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.as_bytes().to_vec()))
        .collect()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn local_crud() {
    let mut ts = Clock::default();
    let mut a = LWWDict::new();

    a.put(k("a"), "1", ts.tick());
    a.put(k("a"), "11", 0);
    assert_eq!(a.get(&k("a")).value(), Some(&b"1"[..]));

    a.put(k("b"), "22", 0);
    a.put(k("b"), "2", ts.tick());
    assert_eq!(a.get(&k("b")).value(), Some(&b"2"[..]));

    assert_eq!(a.to_map(), export(&[("a", "1"), ("b", "2")]));

    a.delete(k("a"), ts.tick());
    assert_eq!(a.get(&k("a")).value(), None);

    // Older than the put at 2.
    a.delete(k("b"), 1);
    assert_eq!(a.get(&k("b")).value(), Some(&b"2"[..]));

    assert_eq!(a.to_map(), export(&[("b", "2")]));
    assert_eq!(a.clone(), a);
}

#[test]
fn two_replicas_converge_after_exchange() {
    init_tracing();

    let (mut a, mut a_ts) = (LWWDict::new(), Clock::default());
    let (mut b, mut b_ts) = (LWWDict::new(), Clock::default());

    a.put(k("a"), "1", a_ts.tick());
    a.put(k("b"), "2", a_ts.tick());
    b.put(k("c"), "3", b_ts.tick());

    let snapshot = a.clone();
    a.merge(&snapshot);
    a.merge_from(None);
    a.merge(&b);
    a_ts.witness(b_ts.0);
    b.merge(&a);
    b_ts.witness(a_ts.0);

    assert_eq!(a, b);
    assert_eq!(a.to_map(), export(&[("a", "1"), ("b", "2"), ("c", "3")]));

    a.delete(k("c"), a_ts.tick());
    b.delete(k("b"), b_ts.tick());

    a.merge(&b);
    a_ts.witness(b_ts.0);
    b.merge(&a);
    b_ts.witness(a_ts.0);

    assert_eq!(a, b);
    assert_eq!(a.to_map(), export(&[("a", "1")]));
    assert_eq!(a.to_map(), b.to_map());
}

#[test]
fn same_timestamp_puts_converge_on_largest_value() {
    let mut a = LWWDict::new();
    let mut b = LWWDict::new();
    let mut c = LWWDict::new();

    a.put(k("a"), "1", 1);
    b.put(k("a"), "2", 1);
    c.put(k("a"), "3", 1);

    a.merge(&b);
    a.merge(&c);
    c.merge(&a);
    b.merge(&a);

    assert_eq!(a, b);
    assert_eq!(b, c);
    for replica in [&a, &b, &c] {
        assert_eq!(
            replica.get(&k("a")),
            Lookup::Live {
                value: b"3",
                timestamp: 1
            }
        );
    }
}

#[test]
fn pairwise_exchange_in_any_order_converges() {
    let mut base = Vec::new();
    for value in ["1", "2", "3"] {
        let mut d = LWWDict::new();
        d.put(k("a"), value, 1);
        base.push(d);
    }

    // Every ordered pair, twice over, in several shuffled orders.
    let mut pairs: Vec<(usize, usize)> = Vec::new();
    for i in 0..3 {
        for j in 0..3 {
            if i != j {
                pairs.push((i, j));
                pairs.push((i, j));
            }
        }
    }

    let mut rng = StdRng::seed_from_u64(0x11_d1c7);
    for _ in 0..20 {
        let mut replicas = base.clone();
        pairs.shuffle(&mut rng);
        // Repeat the round so late merges still reach everyone.
        for _ in 0..2 {
            for &(from, into) in &pairs {
                let remote = replicas[from].clone();
                replicas[into].merge(&remote);
            }
        }

        for replica in &replicas {
            assert_eq!(replica, &replicas[0]);
            assert_eq!(replica.get(&k("a")).value(), Some(&b"3"[..]));
            assert_eq!(replica.get(&k("a")).timestamp(), 1);
        }
    }
}

#[test]
fn four_replicas_with_deletes_converge() {
    let mut a = LWWDict::new();
    let mut b = LWWDict::new();
    let mut c = LWWDict::new();
    let mut d = LWWDict::new();

    a.put(k("x"), "a", 1);
    b.put(k("x"), "b", 2);
    c.delete(k("x"), 2);
    d.put(k("y"), "d", 3);
    d.delete(k("x"), 1);

    let states = [a.clone(), b.clone(), c.clone(), d.clone()];
    for replica in [&mut a, &mut b, &mut c, &mut d] {
        for remote in states.iter().rev() {
            replica.merge(remote);
        }
    }

    assert_eq!(a, b);
    assert_eq!(b, c);
    assert_eq!(c, d);
    // Put and delete tie at 2, default bias hides the put.
    assert_eq!(a.get(&k("x")), Lookup::Deleted { timestamp: 2 });
    assert_eq!(a.to_map(), export(&[("y", "d")]));
}

#[test]
fn put_bias_replicas_converge_on_visible_tie() {
    let mut a = LWWDict::with_bias(Bias::Put);
    let mut b = LWWDict::with_bias(Bias::Put);

    a.put(k("k"), "v", 5);
    b.delete(k("k"), 5);

    a.merge(&b);
    b.merge(&a);

    assert_eq!(a, b);
    assert_eq!(a.to_map(), export(&[("k", "v")]));
}

#[test]
fn delete_dominates_every_older_put() {
    let mut replicas: Vec<LWWDict> = (0..5u64)
        .map(|i| {
            let mut d = LWWDict::new();
            d.put(k("k"), format!("v{i}"), i);
            d
        })
        .collect();
    replicas[2].delete(k("k"), 10);

    let mut merged = LWWDict::new();
    for r in &replicas {
        merged.merge(r);
    }
    assert_eq!(merged.get(&k("k")), Lookup::Deleted { timestamp: 10 });

    replicas.reverse();
    let mut reversed = LWWDict::new();
    for r in &replicas {
        reversed.merge(r);
    }
    assert_eq!(merged, reversed);
}

#[test]
fn snapshot_for_send_is_isolated() {
    let mut replica = LWWDict::new();
    replica.put(k("a"), "1", 1);

    let outgoing = replica.clone();
    assert_eq!(outgoing.to_map(), replica.to_map());

    replica.put(k("a"), "2", 2);
    replica.delete(k("b"), 3);

    assert_eq!(outgoing.to_map(), export(&[("a", "1")]));
    assert!(outgoing.delete_state().is_empty());
}

#[test]
fn independent_replicas_on_threads_converge() {
    let handles: Vec<_> = (0..4u64)
        .map(|id| {
            thread::spawn(move || {
                let mut d = LWWDict::new();
                for n in 0..50u64 {
                    let key = format!("key-{}", n % 10);
                    let ts = n * 4 + id;
                    if n % 7 == 0 {
                        d.delete(key, ts);
                    } else {
                        d.put(key, format!("{id}:{n}"), ts);
                    }
                }
                d
            })
        })
        .collect();

    let replicas: Vec<LWWDict> = handles
        .into_iter()
        .map(|h| h.join().expect("replica thread panicked"))
        .collect();

    let mut forward = LWWDict::new();
    for r in &replicas {
        forward.merge(r);
    }
    let mut backward = LWWDict::new();
    for r in replicas.iter().rev() {
        backward.merge(r);
    }

    assert_eq!(forward, backward);
}

#[test]
fn shared_instance_behind_a_lock() {
    let shared = Arc::new(Mutex::new(LWWDict::new()));

    let writers: Vec<_> = (0..4u64)
        .map(|id| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                for n in 0..25u64 {
                    let mut guard = shared.lock().expect("lock poisoned");
                    guard.put(format!("w{id}"), format!("{n}"), n);
                }
            })
        })
        .collect();
    for w in writers {
        w.join().expect("writer thread panicked");
    }

    let dict = shared.lock().expect("lock poisoned");
    assert_eq!(dict.len(), 4);
    for id in 0..4 {
        assert_eq!(
            dict.get(&format!("w{id}")),
            Lookup::Live {
                value: b"24",
                timestamp: 24
            }
        );
    }
}

#[test]
fn delta_sync_matches_full_state_sync() {
    let mut a = LWWDict::new();
    let mut b = LWWDict::new();
    for n in 0..20u64 {
        a.put(format!("k{}", n % 6), format!("a{n}"), n);
        if n % 3 == 0 {
            b.delete(format!("k{}", n % 6), n + 1);
        }
        b.put(format!("k{}", n % 4), format!("b{n}"), n);
    }

    let mut full_a = a.clone();
    full_a.merge(&b);
    let mut full_b = b.clone();
    full_b.merge(&a);

    let to_b: LWWDictDelta = a.delta(&b);
    let to_a: LWWDictDelta = b.delta(&a);
    a.apply_delta(&to_a);
    b.apply_delta(&to_b);

    assert_eq!(a, full_a);
    assert_eq!(b, full_b);
    assert_eq!(a, b);
}
