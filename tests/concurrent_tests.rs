//! Independent messages built on separate threads

use std::{
    sync::{Arc, Barrier},
    thread,
};

use tessera::{
    arena::ArenaConfig,
    layout::ElementSize,
    message::MessageBuilder,
    Result,
};

/// Build the same message every time: a root with a byte list and a struct
/// list whose contents depend only on `rows`
fn build(config: ArenaConfig, rows: usize) -> Result<Vec<Vec<u8>>> {
    let message = MessageBuilder::new(config)?;
    let root = message.init_root(16)?;
    root.new_list(0, ElementSize::Byte, 5)?
        .copy_from_slice(&[0u8, 1, 2, 3, 4])?;

    let items = root.new_struct_list(8, 16, rows as i64)?;
    for i in 0..rows {
        let item = items.struct_at(i)?;
        item.set::<u64>(0, i as u64 * 3)?;
        item.set_text(8, &format!("item-{}", i))?;
    }
    Ok(message.finish()?.into_segments())
}

#[cfg(test)]
mod concurrent_tests {
    use super::*;

    #[test]
    fn test_threads_match_single_threaded_bytes() {
        let config = ArenaConfig::new(64);
        let expected = build(config.clone(), 50).unwrap();
        assert!(expected.len() > 1);

        let thread_count = 8;
        let barrier = Arc::new(Barrier::new(thread_count));
        let handles: Vec<_> = (0..thread_count)
            .map(|_| {
                let barrier = barrier.clone();
                let config = config.clone();
                thread::spawn(move || {
                    barrier.wait();
                    build(config, 50)
                })
            })
            .collect();

        for handle in handles {
            let segments = handle.join().unwrap().unwrap();
            assert_eq!(segments, expected);
        }
    }

    #[test]
    fn test_builder_moves_between_threads() {
        let message = MessageBuilder::new(ArenaConfig::new(32)).unwrap();
        message.init_root(8).unwrap().set::<u64>(0, 11).unwrap();

        let finished = thread::spawn(move || {
            let root = message.get_root().unwrap().unwrap();
            root.set::<u64>(0, root.get::<u64>(0).unwrap() + 1).unwrap();
            message.finish().unwrap()
        })
        .join()
        .unwrap();

        let reader = finished.reader();
        assert_eq!(reader.root().unwrap().get::<u64>(0).unwrap(), 12);
    }

    #[test]
    fn test_finished_segments_shared_across_readers() {
        let finished = Arc::new({
            let message = MessageBuilder::with_defaults().unwrap();
            message
                .init_root(8)
                .unwrap()
                .set_text(0, "shared")
                .unwrap();
            message.finish().unwrap()
        });

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let finished = finished.clone();
                thread::spawn(move || {
                    let reader = finished.reader();
                    let root = reader.root().unwrap();
                    root.get_text(0).unwrap().to_string()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), "shared");
        }
    }
}
