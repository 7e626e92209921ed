// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

// A deterministic out-of-crate target, proving the public surface is
// enough to write one, and driving the renderer protocol end to end.

use std::io::Write;
use std::sync::{Arc, Mutex};

use vgr::{
    Area, Box2, Color, Dst, Event, Image, Options, Output, Path, Renderable, Renderer, Size2,
    Status, Target, Warning, P2,
};

/// Serializes every renderable textually, one line per image.
struct DumpTarget {
    once: bool,
    pending: Vec<u8>,
    off: usize,
}

impl DumpTarget {
    fn new(once: bool) -> DumpTarget {
        DumpTarget {
            once,
            pending: Vec::new(),
            off: 0,
        }
    }

    fn pump(&mut self, out: &mut Output) -> Status {
        self.off += out.writes(&self.pending[self.off..]);
        if self.off == self.pending.len() {
            Status::Ok
        } else {
            Status::Partial
        }
    }
}

impl Target for DumpTarget {
    fn once(&self) -> bool {
        self.once
    }

    fn image(&mut self, out: &mut Output, renderable: &Renderable) -> Status {
        self.pending = format!(
            "{:?} {:?} {:?}\n",
            renderable.size, renderable.view, renderable.image
        )
        .into_bytes();
        self.off = 0;
        self.pump(out)
    }

    fn resume(&mut self, out: &mut Output) -> Status {
        self.pump(out)
    }

    fn end(&mut self, out: &mut Output) -> Status {
        self.pending = b"end\n".to_vec();
        self.off = 0;
        self.pump(out)
    }
}

fn scene() -> Renderable {
    let square = Path::new().rect(Box2::new(0.0, 0.0, 1.0, 1.0).unwrap());
    Renderable {
        size: Size2::new(30.0, 30.0).unwrap(),
        view: Box2::new(0.0, 0.0, 1.0, 1.0).unwrap(),
        image: Image::constant(Color::rgb(1.0, 0.0, 0.0)).cut(Area::NonZero, square),
    }
}

fn buffer_run(events: Vec<Event>) -> Vec<u8> {
    let mut r = Renderer::new(Box::new(DumpTarget::new(true)), Dst::Buffer(Vec::new()));
    for ev in events {
        assert_eq!(r.render(ev).unwrap(), Status::Ok);
    }
    match r.into_dst() {
        Dst::Buffer(bytes) => bytes,
        _ => unreachable!(),
    }
}

// Sends an event to a manual renderer, harvesting windows of
// `window` bytes until the event completes.
fn manual_send(r: &mut Renderer, collected: &mut Vec<u8>, window: usize, ev: Event) {
    let mut status = r.render(ev).unwrap();
    while status == Status::Partial {
        let rem = r.manual_dst_rem();
        let old = r.manual_dst(vec![0; window], 0, window).unwrap();
        let filled = old.len() - rem;
        collected.extend_from_slice(&old[..filled]);
        status = r.render(Event::Await).unwrap();
    }
}

fn manual_harvest(r: &mut Renderer, collected: &mut Vec<u8>) {
    let rem = r.manual_dst_rem();
    let old = r.manual_dst(Vec::new(), 0, 0).unwrap();
    let filled = old.len() - rem;
    collected.extend_from_slice(&old[..filled]);
}

#[test]
fn buffer_and_manual_agree() {
    let reference = buffer_run(vec![Event::Image(scene()), Event::End]);
    assert!(!reference.is_empty());
    assert!(reference.ends_with(b"end\n"));

    // Tiny windows force many partial rounds.
    for &window in &[1usize, 7, 64, 4096] {
        let mut r = Renderer::new(Box::new(DumpTarget::new(true)), Dst::Manual);
        let mut collected = Vec::new();
        manual_send(&mut r, &mut collected, window, Event::Image(scene()));
        manual_send(&mut r, &mut collected, window, Event::End);
        manual_harvest(&mut r, &mut collected);
        assert_eq!(collected, reference, "window size {}", window);
    }
}

#[test]
fn buffer_and_channel_agree() {
    #[derive(Clone)]
    struct SharedSink(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedSink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let reference = buffer_run(vec![Event::Image(scene()), Event::End]);

    let sink = SharedSink(Arc::new(Mutex::new(Vec::new())));
    let mut r = Renderer::new(
        Box::new(DumpTarget::new(true)),
        Dst::Channel(Box::new(sink.clone())),
    );
    assert_eq!(r.render(Event::Image(scene())).unwrap(), Status::Ok);
    assert_eq!(r.render(Event::End).unwrap(), Status::Ok);

    assert_eq!(*sink.0.lock().unwrap(), reference);
}

#[test]
fn single_image_rejected() {
    let mut r = Renderer::new(Box::new(DumpTarget::new(true)), Dst::Buffer(Vec::new()));
    r.render(Event::Image(scene())).unwrap();
    assert!(matches!(
        r.render(Event::Image(scene())),
        Err(vgr::Error::SingleImage)
    ));
}

#[test]
fn loop_mode_accepts_many() {
    let mut r = Renderer::new(Box::new(DumpTarget::new(false)), Dst::Buffer(Vec::new()));
    for _ in 0..5 {
        assert_eq!(r.render(Event::Image(scene())).unwrap(), Status::Ok);
    }
    assert_eq!(r.render(Event::End).unwrap(), Status::Ok);

    match r.into_dst() {
        Dst::Buffer(bytes) => {
            let text = String::from_utf8(bytes).unwrap();
            assert_eq!(text.lines().count(), 6);
        }
        _ => unreachable!(),
    }
}

#[test]
fn partial_only_under_manual() {
    // A buffer destination never stalls, even on big payloads.
    struct Big;

    impl Target for Big {
        fn once(&self) -> bool {
            true
        }

        fn image(&mut self, out: &mut Output, _: &Renderable) -> Status {
            let chunk = vec![0xAB; 1 << 20];
            assert_eq!(out.writes(&chunk), chunk.len());
            Status::Ok
        }

        fn resume(&mut self, _: &mut Output) -> Status {
            Status::Ok
        }

        fn end(&mut self, _: &mut Output) -> Status {
            Status::Ok
        }
    }

    let mut r = Renderer::new(Box::new(Big), Dst::Buffer(Vec::new()));
    assert_eq!(r.render(Event::Image(scene())).unwrap(), Status::Ok);
    assert_eq!(r.render(Event::End).unwrap(), Status::Ok);
    match r.into_dst() {
        Dst::Buffer(bytes) => assert_eq!(bytes.len(), 1 << 20),
        _ => unreachable!(),
    }
}

#[test]
fn warnings_do_not_abort() {
    struct Warner;

    impl Target for Warner {
        fn once(&self) -> bool {
            true
        }

        fn image(&mut self, out: &mut Output, renderable: &Renderable) -> Status {
            out.warn(Warning::UnsupportedCut(
                Area::EvenOdd,
                renderable.image.clone(),
            ));
            out.warn(Warning::Other("glyph cuts are not supported".to_string()));
            out.writes(b"ok");
            Status::Ok
        }

        fn resume(&mut self, _: &mut Output) -> Status {
            Status::Ok
        }

        fn end(&mut self, _: &mut Output) -> Status {
            Status::Ok
        }
    }

    let warnings = Arc::new(Mutex::new(Vec::new()));
    let sink = warnings.clone();
    let opts = Options {
        warn: Some(Box::new(move |w: &Warning| {
            sink.lock().unwrap().push(format!("{}", w));
        })),
        ..Options::default()
    };

    let mut r = Renderer::with_options(Box::new(Warner), opts, Dst::Buffer(Vec::new()));
    assert_eq!(r.render(Event::Image(scene())).unwrap(), Status::Ok);
    assert_eq!(r.render(Event::End).unwrap(), Status::Ok);

    let warnings = warnings.lock().unwrap();
    assert_eq!(warnings.len(), 2);
    assert!(warnings[0].contains("unsupported cut"));

    match r.into_dst() {
        Dst::Buffer(bytes) => assert_eq!(bytes, b"ok"),
        _ => unreachable!(),
    }
}

#[test]
fn renderer_accessors() {
    let meta = vgr::Meta::new().add(&vgr::keys::title(), "doc".to_string());
    let opts = Options {
        limit: 512,
        meta: meta.clone(),
        ..Options::default()
    };
    let r = Renderer::with_options(Box::new(DumpTarget::new(true)), opts, Dst::Buffer(Vec::new()));
    assert_eq!(r.limit(), 512);
    assert_eq!(*r.meta(), meta);
    assert!(matches!(r.dst(), Dst::Buffer(_)));
}

#[test]
fn targets_can_flatten_paths() {
    // A target-side consumer of the geometry helpers.
    let circle = Path::new().circle(P2::new(0.0, 0.0), 2.0);
    let mut polyline = Vec::new();
    circle.flatten(Path::DEFAULT_TOLERANCE, |seg| polyline.push(seg));
    assert!(polyline.len() > 32);

    let mut cubics = 0;
    let ok = vgr::earc_to_cubics(
        P2::new(2.0, 0.0),
        vgr::V2::new(2.0, 2.0),
        0.0,
        false,
        false,
        P2::new(-2.0, 0.0),
        Path::DEFAULT_TOLERANCE,
        |_, _, _| cubics += 1,
    );
    assert!(ok);
    assert!(cubics >= 2);
}
