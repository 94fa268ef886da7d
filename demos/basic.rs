use virtual_list::{FnSource, HeadlessSurface, VirtualList, VirtualListOptions};

fn main() {
    let source = FnSource::new(
        |i| (i < 10_000).then(|| format!("Post #{i}")),
        |title: &String, _| Ok(title.clone()),
    );
    let opts = VirtualListOptions::fixed(10_000, 80).with_overscan(5);
    let mut list = match VirtualList::new(HeadlessSurface::new(800), source, opts) {
        Ok(list) => list,
        Err(err) => {
            eprintln!("failed to build list: {err}");
            return;
        }
    };

    println!("total_height={}", list.total_height());
    println!("render_window={:?}", list.render_window());

    // The host forwards the scroll event, then ticks when the throttle expires.
    list.surface_mut().scroll_to(400_000);
    list.on_scroll(0);
    if let Some(at) = list.next_deadline(0) {
        list.tick(at);
    }

    let frame = list.surface().frame();
    println!(
        "after scroll: window={:?} top_spacer={} bottom_spacer={} rows={}",
        list.render_window(),
        frame.top_spacer,
        frame.bottom_spacer,
        frame.rows.len()
    );
    println!("first row view={:?}", list.surface().view_at(4_995));
    println!("metrics={:?}", list.metrics());
}
