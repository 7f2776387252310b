// Example: lenses, derived cells and a debounced search box.
use std::rc::Rc;

use toulouse_var::{ManualScheduler, Scheduler, Var, lift2};

#[derive(Clone, Debug, PartialEq)]
struct Form {
    query: String,
    limit: usize,
}

fn main() {
    let form = Var::new(Form {
        query: String::new(),
        limit: 10,
    });
    let query = form.prop(|f| &f.query, |f| &mut f.query);
    let limit = form.prop(|f| &f.limit, |f| &mut f.limit);

    let summary = lift2(&query, &limit, |q: &String, n: &usize| format!("{q:?} (top {n})"));
    let _print = summary.effect_now(|s: &String, _: &String| println!("summary: {s}"));

    let clock = Rc::new(ManualScheduler::new());
    let scheduler: Rc<dyn Scheduler> = clock.clone();
    let _search = query
        .debounce(&scheduler, 250)
        .effect(|q: &String, _: &String| println!("search for {q:?}"));

    for (i, text) in ["t", "to", "tou", "toulouse"].into_iter().enumerate() {
        query.set(String::from(text));
        clock.advance(if i == 2 { 300 } else { 100 });
    }
    clock.advance(250);

    limit.set(25);
    println!("form = {:?}", form.get());
}
