// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fmt;
use std::io::{self, Write};
use std::mem;

use crate::{Area, Box2, Error, Image, Meta, Size2};

/// The output window size used for buffer and channel destinations.
const IO_BUF_SIZE: usize = 65536;

/// What to render and how big.
///
/// `size` is the physical output size in millimeters, `view` the
/// rectangle of the image's coordinate space mapped onto it.
#[derive(Clone, Debug)]
pub struct Renderable {
    /// The physical size of the output, in millimeters.
    pub size: Size2,
    /// The part of the image rendered onto `size`.
    pub view: Box2,
    /// The image itself.
    pub image: Image,
}

/// Events understood by [`Renderer::render`].
#[derive(Clone, Debug)]
pub enum Event {
    /// Resumes a renderer that returned [`Status::Partial`].
    ///
    /// Only meaningful on manual destinations, after a new output
    /// window was installed with [`Renderer::manual_dst`].
    Await,
    /// Renders an image.
    Image(Renderable),
    /// Ends rendering.
    End,
}

/// Result of a render step.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Status {
    /// The event was fully processed.
    Ok,
    /// The renderer ran out of output window space and wants more.
    ///
    /// Only manual destinations return this.
    Partial,
}

/// Non-fatal rendering warnings.
///
/// A target reports what it cannot honor and renders a best-effort
/// approximation; rendering always continues.
#[derive(Clone, Debug)]
pub enum Warning {
    /// The target cannot render a cut with this area.
    UnsupportedCut(Area, Image),
    /// The target cannot render a glyph cut with this area.
    UnsupportedGlyphCut(Area, Image),
    /// A target specific condition.
    Other(String),
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Warning::UnsupportedCut(area, _) => {
                write!(f, "unsupported cut area: {:?}", area)
            }
            Warning::UnsupportedGlyphCut(area, _) => {
                write!(f, "unsupported glyph cut area: {:?}", area)
            }
            Warning::Other(s) => write!(f, "{}", s),
        }
    }
}

/// A warning callback.
pub type WarnFn = Box<dyn FnMut(&Warning) + Send>;

/// Where rendered bytes go.
pub enum Dst {
    /// Bytes accumulate in an owned buffer, retrieved with
    /// [`Renderer::into_dst`].
    Buffer(Vec<u8>),
    /// Bytes are written to a sink as the window fills.
    Channel(Box<dyn Write + Send>),
    /// The caller owns the output windows; see [`Renderer::manual_dst`].
    Manual,
    /// The target manages output itself; writer primitives discard.
    Other,
}

impl fmt::Debug for Dst {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Dst::Buffer(b) => write!(f, "Dst::Buffer({} bytes)", b.len()),
            Dst::Channel(_) => f.write_str("Dst::Channel(..)"),
            Dst::Manual => f.write_str("Dst::Manual"),
            Dst::Other => f.write_str("Dst::Other"),
        }
    }
}

/// Renderer creation options.
pub struct Options {
    /// A soft step budget targets may consult. Purely advisory.
    pub limit: usize,
    /// The warning callback. Warnings are logged when unset.
    pub warn: Option<WarnFn>,
    /// Renderer metadata, for targets that embed document information.
    pub meta: Meta,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            limit: usize::MAX,
            warn: None,
            meta: Meta::new(),
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Options")
            .field("limit", &self.limit)
            .field("warn", &self.warn.is_some())
            .field("meta", &self.meta)
            .finish()
    }
}

/// A render target.
///
/// Targets turn renderables into bytes through the [`Output`] writer
/// primitives. A target is a resumable state machine: when a writer
/// runs out of window space it reports short counts, the target
/// returns [`Status::Partial`] keeping track of its progress, and the
/// driver calls [`resume`](Target::resume) once the user installed a
/// fresh window.
pub trait Target {
    /// Whether the target accepts a single image before `End`.
    fn once(&self) -> bool;

    /// Starts rendering `renderable`.
    fn image(&mut self, out: &mut Output, renderable: &Renderable) -> Status;

    /// Resumes the pending step after a [`Status::Partial`].
    fn resume(&mut self, out: &mut Output) -> Status;

    /// Finishes the output, writing any trailer bytes.
    fn end(&mut self, out: &mut Output) -> Status;
}

/// The output side of a renderer, handed to targets.
///
/// Writer primitives behave uniformly across destinations: buffer and
/// channel destinations flush the window as it fills and never stall,
/// manual destinations report short writes until the user installs a
/// new window, and opaque destinations accept and discard.
pub struct Output {
    dst: Dst,
    buf: Vec<u8>,
    pos: usize,
    max: usize,
    limit: usize,
    meta: Meta,
    warn: Option<WarnFn>,
    err: Option<io::Error>,
}

impl Output {
    fn new(dst: Dst, opts: Options) -> Output {
        let (buf, max) = match dst {
            Dst::Buffer(_) | Dst::Channel(_) => (vec![0; IO_BUF_SIZE], IO_BUF_SIZE),
            Dst::Manual | Dst::Other => (Vec::new(), 0),
        };

        Output {
            dst,
            buf,
            pos: 0,
            max,
            limit: opts.limit,
            meta: opts.meta,
            warn: opts.warn,
            err: None,
        }
    }

    /// Writes a single byte.
    ///
    /// Returns `false` when the byte was not written because the
    /// window is full and the destination is manual.
    pub fn writeb(&mut self, b: u8) -> bool {
        if let Dst::Other = self.dst {
            return true;
        }

        if self.pos == self.max && !self.make_room() {
            return false;
        }

        self.buf[self.pos] = b;
        self.pos += 1;
        true
    }

    /// Writes bytes, returning how many were consumed.
    ///
    /// Short counts happen only on manual destinations with a full
    /// window.
    pub fn writes(&mut self, s: &[u8]) -> usize {
        if let Dst::Other = self.dst {
            return s.len();
        }

        let mut written = 0;
        while written < s.len() {
            if self.pos == self.max && !self.make_room() {
                break;
            }

            let n = (self.max - self.pos).min(s.len() - written);
            self.buf[self.pos..self.pos + n].copy_from_slice(&s[written..written + n]);
            self.pos += n;
            written += n;
        }

        written
    }

    fn make_room(&mut self) -> bool {
        match &mut self.dst {
            Dst::Buffer(out) => {
                out.extend_from_slice(&self.buf[..self.pos]);
                self.pos = 0;
                true
            }
            Dst::Channel(w) => {
                if self.err.is_none() {
                    if let Err(e) = w.write_all(&self.buf[..self.pos]) {
                        self.err = Some(e);
                    }
                }
                self.pos = 0;
                true
            }
            Dst::Manual => false,
            Dst::Other => {
                self.pos = 0;
                true
            }
        }
    }

    // Final flush at `End` for buffer and channel destinations.
    fn finish(&mut self) {
        match &mut self.dst {
            Dst::Buffer(_) | Dst::Channel(_) => {
                self.make_room();
                if let Dst::Channel(w) = &mut self.dst {
                    if self.err.is_none() {
                        if let Err(e) = w.flush() {
                            self.err = Some(e);
                        }
                    }
                }
            }
            Dst::Manual | Dst::Other => {}
        }
    }

    /// Reports a warning.
    ///
    /// Invokes the renderer's warning callback, or logs the warning
    /// when none was set.
    pub fn warn(&mut self, warning: Warning) {
        match &mut self.warn {
            Some(f) => f(&warning),
            None => log::warn!("{}", warning),
        }
    }

    /// Returns the destination descriptor.
    #[inline]
    pub fn dst(&self) -> &Dst {
        &self.dst
    }

    /// Returns the renderer metadata.
    #[inline]
    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// Returns the renderer step budget.
    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns the remaining free bytes of the output window.
    #[inline]
    pub fn dst_rem(&self) -> usize {
        self.max - self.pos
    }

    fn take_err(&mut self) -> Option<io::Error> {
        self.err.take()
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Output")
            .field("dst", &self.dst)
            .field("window", &(self.pos, self.max))
            .finish()
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
enum State {
    AwaitingImage,
    Rendering,
    AwaitingEnd,
    Ending,
    Ended,
}

/// A renderer feeds images through a target into a destination.
///
/// The renderer accepts a stream of [`Event`]s: one or more `Image`s
/// followed by `End`, with `Await` resuming partial renders on manual
/// destinations. See the crate documentation for the full protocol.
pub struct Renderer {
    target: Box<dyn Target>,
    out: Output,
    state: State,
    once: bool,
}

impl Renderer {
    /// Creates a new renderer with default options.
    pub fn new(target: Box<dyn Target>, dst: Dst) -> Renderer {
        Renderer::with_options(target, Options::default(), dst)
    }

    /// Creates a new renderer.
    pub fn with_options(target: Box<dyn Target>, opts: Options, dst: Dst) -> Renderer {
        let once = target.once();
        Renderer {
            target,
            out: Output::new(dst, opts),
            state: State::AwaitingImage,
            once,
        }
    }

    /// Processes one event.
    ///
    /// Returns [`Status::Partial`] when the target needs a fresh output
    /// window; install one with [`manual_dst`](Renderer::manual_dst)
    /// and send [`Event::Await`].
    pub fn render(&mut self, event: Event) -> Result<Status, Error> {
        let status = match event {
            Event::Image(ref renderable) => match self.state {
                State::AwaitingImage => {
                    let status = self.target.image(&mut self.out, renderable);
                    self.state = match status {
                        Status::Ok => self.after_image(),
                        Status::Partial => State::Rendering,
                    };
                    status
                }
                State::AwaitingEnd => return Err(Error::SingleImage),
                State::Rendering | State::Ending => return Err(Error::AwaitExpected),
                State::Ended => return Err(Error::EndRendered),
            },
            Event::Await => match self.state {
                State::Rendering => {
                    let status = self.target.resume(&mut self.out);
                    if status == Status::Ok {
                        self.state = self.after_image();
                    }
                    status
                }
                State::Ending => {
                    let status = self.target.resume(&mut self.out);
                    if status == Status::Ok {
                        self.out.finish();
                        self.state = State::Ended;
                    }
                    status
                }
                _ => return Err(Error::AwaitExpected),
            },
            Event::End => match self.state {
                State::AwaitingImage | State::AwaitingEnd => {
                    let status = self.target.end(&mut self.out);
                    match status {
                        Status::Ok => {
                            self.out.finish();
                            self.state = State::Ended;
                        }
                        Status::Partial => self.state = State::Ending,
                    }
                    status
                }
                State::Rendering | State::Ending => return Err(Error::AwaitExpected),
                State::Ended => return Err(Error::EndRendered),
            },
        };

        if let Some(e) = self.out.take_err() {
            self.state = State::Ended;
            return Err(Error::Io(e));
        }

        Ok(status)
    }

    fn after_image(&self) -> State {
        if self.once {
            State::AwaitingEnd
        } else {
            State::AwaitingImage
        }
    }

    /// Installs a new output window over `buf[from..to]`.
    ///
    /// Returns the previous window buffer with everything written so
    /// far. Only valid on [`Dst::Manual`] renderers.
    pub fn manual_dst(&mut self, buf: Vec<u8>, from: usize, to: usize) -> Result<Vec<u8>, Error> {
        assert!(
            matches!(self.out.dst, Dst::Manual),
            "the renderer destination is not manual"
        );

        if from > to || to > buf.len() {
            return Err(Error::BoundsOutOfRange);
        }

        let old = mem::replace(&mut self.out.buf, buf);
        self.out.pos = from;
        self.out.max = to;
        Ok(old)
    }

    /// Returns the remaining free bytes of the manual output window.
    pub fn manual_dst_rem(&self) -> usize {
        self.out.dst_rem()
    }

    /// Returns the destination descriptor.
    #[inline]
    pub fn dst(&self) -> &Dst {
        self.out.dst()
    }

    /// Consumes the renderer, returning its destination.
    ///
    /// For buffer destinations this is how the rendered bytes are
    /// retrieved after `End`.
    pub fn into_dst(self) -> Dst {
        self.out.dst
    }

    /// Returns the renderer metadata.
    #[inline]
    pub fn meta(&self) -> &Meta {
        self.out.meta()
    }

    /// Returns the renderer step budget.
    #[inline]
    pub fn limit(&self) -> usize {
        self.out.limit()
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("out", &self.out)
            .field("state", &self.state)
            .field("once", &self.once)
            .finish()
    }
}
