use virtual_list::{FnSource, HeadlessSurface, NavKey, Surface, VirtualList, VirtualListOptions};

fn main() {
    let source = FnSource::new(
        |i| (i < 10_000).then_some(i),
        |i: &usize, _| Ok(format!("row {i}")),
    );
    let opts = VirtualListOptions::fixed(10_000, 80);
    let mut list = match VirtualList::new(HeadlessSurface::new(800), source, opts) {
        Ok(list) => list,
        Err(err) => {
            eprintln!("failed to build list: {err}");
            return;
        }
    };

    for name in ["ArrowDown", "PageDown", "PageDown", "End", "Home", "Enter"] {
        let Some(key) = NavKey::from_key_name(name) else {
            println!("{name}: not handled");
            continue;
        };
        let moved = list.handle_key(key);
        println!(
            "{name}: moved={moved} focused={:?} scroll_top={}",
            list.focused_index(),
            list.surface().viewport().scroll_top
        );
    }

    for text in list.surface().announcements() {
        println!("live region: {text}");
    }
}
