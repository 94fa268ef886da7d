use virtual_list::{Align, FnSource, HeadlessSurface, VirtualList, VirtualListOptions};

fn main() {
    let count = 1_000;
    let mut surface = HeadlessSurface::new(600);
    // Pretend the layout engine found these heights.
    for i in 0..count {
        surface.set_layout_height(i, 40 + (i as u32 * 37) % 120);
    }

    let source = FnSource::new(
        |i| (i < 1_000).then_some(i),
        |i: &usize, _| Ok(format!("comment {i}")),
    );
    let opts = VirtualListOptions::variable(count, 80).with_measure_epsilon(0);
    let mut list = match VirtualList::new(surface, source, opts) {
        Ok(list) => list,
        Err(err) => {
            eprintln!("failed to build list: {err}");
            return;
        }
    };
    println!("estimated total_height={}", list.total_height());

    // Deliver size-observer callbacks until the window stops moving.
    loop {
        let reports = list.surface().take_size_reports();
        let mut applied = false;
        for r in reports {
            applied |= list.on_size_report(r);
        }
        if !applied {
            break;
        }
    }
    println!(
        "after first measurements: total_height={} measured={}",
        list.total_height(),
        list.export_measurements().len()
    );

    // Jump into the middle; rows above the viewport keep the content anchored when measured.
    let offset = list.scroll_to_index(500, Align::Center);
    println!("scroll_to_index(500) -> {offset}, window={:?}", list.render_window());

    let saved = list.export_measurements();
    list.refresh();
    let applied = list.import_measurements(saved);
    println!("restored {applied} measurements, total_height={}", list.total_height());
    println!("metrics={:?}", list.metrics());

    list.destroy();
}
