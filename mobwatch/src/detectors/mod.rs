// mobwatch/src/detectors/mod.rs
//
// The four pattern detectors. All are pure functions over state the
// engine already holds — they return a non-negative sub-score and are
// total over their input domain: malformed or absent fields degrade to
// "no signal", never to an error.
//
// The engine runs them in a fixed order per message (pile-on, velocity,
// silencing, targeting); targeting must run after the message is stored
// because it appends to the targeting ledger for the current message.

pub mod pile_on;
pub mod silencing;
pub mod targeting;
pub mod velocity;
