use pitchmask::{PitchShifter, PitchShifterBuilder, Ratio, SharedPitchShifter, ShifterControl, ShifterError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const BLOCK_SIZE: usize = 128;

/// Test concurrent processing
///
/// Only one thread may be inside the shifter at a time. Calls that lose the race must come back
/// as `ProcessInProgress` without blocking, and every call that wins must have written exactly
/// one block.
#[test]
fn test_concurrent_processing() {
    let shifter = Arc::new(SharedPitchShifter::new(PitchShifter::new(44100).unwrap()));
    let processed = Arc::new(AtomicUsize::new(0));
    let refused = Arc::new(AtomicUsize::new(0));

    let mut handles = vec![];

    for _ in 0..4 {
        let shifter = shifter.clone();
        let processed = processed.clone();
        let refused = refused.clone();
        let handle = thread::spawn(move || {
            let input = vec![0.5f32; BLOCK_SIZE];

            for _ in 0..100 {
                match shifter.process(&input, Ratio::Constant(0.7)) {
                    Ok(output) => {
                        assert_eq!(output.len(), BLOCK_SIZE);
                        processed.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(ShifterError::ProcessInProgress) => {
                        refused.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(e) => panic!("Unexpected error: {}", e),
                }

                thread::sleep(Duration::from_micros(100));
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let processed = processed.load(Ordering::Relaxed);
    assert_eq!(processed + refused.load(Ordering::Relaxed), 400);
    assert_eq!(shifter.lock().write_cursor(), (processed * BLOCK_SIZE) as u64);
}

/// A control thread publishes ratios and requests resets while the audio thread keeps running.
/// The audio thread must never leave the lag window or produce a non-finite sample.
#[test]
fn test_control_thread_handoff() {
    let control = Arc::new(ShifterControl::default());
    let mut shifter = PitchShifterBuilder::new(48000).unwrap().build().unwrap();
    shifter.attach_control(control.clone());

    let done = Arc::new(AtomicBool::new(false));
    let controller = {
        let control = control.clone();
        let done = done.clone();
        thread::spawn(move || {
            let ratios = [0.25, 0.7, f32::NAN, 1.0, 2.5, -4.0, 1.5];
            let mut step = 0;
            while !done.load(Ordering::Acquire) {
                control.set_ratio(ratios[step % ratios.len()]);
                if step % 5 == 0 {
                    control.request_reset();
                }
                step += 1;
                thread::sleep(Duration::from_micros(50));
            }
        })
    };

    let input: Vec<f32> = (0..BLOCK_SIZE).map(|n| (n as f32 * 0.1).sin()).collect();
    let mut output = vec![0.0f32; BLOCK_SIZE];
    for _ in 0..2000 {
        shifter.process_controlled_into(&input, &mut output);
        assert!(output.iter().all(|x| x.is_finite()));

        let lag = shifter.lag();
        assert!(lag >= shifter.min_delay() as f64 && lag <= shifter.max_delay() as f64);
        assert!(shifter.write_cursor() >= BLOCK_SIZE as u64);
    }

    done.store(true, Ordering::Release);
    controller.join().unwrap();
}
