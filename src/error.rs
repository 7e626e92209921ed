// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/// List of all errors.
#[derive(Debug)]
pub enum Error {
    /// A geometric query was made on a path without segments.
    EmptyPath,

    /// A byte range does not fit the buffer it addresses.
    BoundsOutOfRange,

    /// `Event::Await` was sent to a renderer that is not awaiting,
    /// or another event was sent while the renderer is awaiting.
    AwaitExpected,

    /// An event was sent to a renderer that has already ended.
    EndRendered,

    /// A second image was sent to a single-image renderer.
    SingleImage,

    /// The metadata map has no binding for the requested key.
    ///
    /// Holds the key name.
    UnboundKey(String),

    /// The channel destination failed to accept bytes.
    Io(std::io::Error),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Error::EmptyPath => {
                write!(f, "the path is empty")
            }
            Error::BoundsOutOfRange => {
                write!(f, "the byte range is out of bounds")
            }
            Error::AwaitExpected => {
                write!(f, "the renderer expected an await event")
            }
            Error::EndRendered => {
                write!(f, "the renderer has already ended")
            }
            Error::SingleImage => {
                write!(f, "the renderer accepts a single image")
            }
            Error::UnboundKey(ref name) => {
                write!(f, "the metadata key '{}' is unbound", name)
            }
            Error::Io(ref e) => {
                write!(f, "the destination failed cause {}", e)
            }
        }
    }
}

impl std::error::Error for Error {}
