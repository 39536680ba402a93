//! Counter application: one store, one scope, one observing consumer

use cradle::{Binding, Merge, Registry, Store};

#[derive(Clone, Debug)]
struct CounterState {
    count: i32,
    step: i32,
}

#[derive(Default)]
struct CounterPatch {
    count: Option<i32>,
    step: Option<i32>,
}

impl Merge for CounterState {
    type Patch = CounterPatch;

    fn merge(&self, patch: CounterPatch) -> Self {
        CounterState {
            count: patch.count.unwrap_or(self.count),
            step: patch.step.unwrap_or(self.step),
        }
    }
}

fn main() {
    println!("=== Counter Application ===\n");

    // Bootstrap: build the store once and provide it to the root scope.
    println!("1. Building the counter store");
    let counter = Store::new(CounterState { count: 0, step: 1 });
    let registry = Registry::new().provide(&counter);

    // A consumer activates: resolve once, observe for the activation's
    // lifetime, wake on every accepted change.
    println!("\n2. Activating an observing consumer");
    let binding = Binding::with_waker(&registry, counter.key(), || {
        println!("   [wake] state changed, consumer re-renders");
    })
    .expect("counter store was provided at bootstrap");

    let print_state = |binding: &Binding<CounterState>| {
        binding.read(|s| {
            println!("   Count: {} | Step: {}", s.count, s.step);
        });
    };

    println!("\n3. Initial state:");
    print_state(&binding);

    println!("\n4. Incrementing three times...");
    for _ in 0..3 {
        counter.update(|s| {
            Some(CounterPatch {
                count: Some(s.count + s.step),
                ..Default::default()
            })
        });
    }
    print_state(&binding);

    println!("\n5. Changing step size to 5 (count untouched by the merge)");
    counter.apply(CounterPatch {
        step: Some(5),
        ..Default::default()
    });
    print_state(&binding);

    println!("\n6. An update that declines (count already large enough)");
    counter.update(|s| {
        (s.count < 3).then(|| CounterPatch {
            count: Some(s.count + s.step),
            ..Default::default()
        })
    });
    print_state(&binding);

    println!(
        "\n7. Consumer saw {} accepted changes",
        binding.revision()
    );

    drop(binding);
    println!(
        "\n8. Consumer deactivated, {} subscribers remain",
        counter.subscriber_count()
    );

    println!("\n✓ Counter application complete!");
}
