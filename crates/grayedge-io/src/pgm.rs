use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use grayedge_image::{Image, ImageSize};

use crate::error::IoError;

/// Number of samples the P2 writer puts on one line before wrapping.
pub const SAMPLES_PER_LINE: usize = 32;

/// The PGM encodings understood by the reader.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PgmFormat {
    /// `P2`: whitespace separated decimal samples.
    Ascii,
    /// `P5`: one raw byte per sample.
    Binary,
}

impl PgmFormat {
    /// The magic number that opens a file of this format.
    pub fn magic(&self) -> &'static str {
        match self {
            PgmFormat::Ascii => "P2",
            PgmFormat::Binary => "P5",
        }
    }

    fn from_magic(magic: &[u8]) -> Result<Self, IoError> {
        match magic {
            b"P2" => Ok(PgmFormat::Ascii),
            b"P5" => Ok(PgmFormat::Binary),
            other => Err(IoError::UnsupportedFormat(
                String::from_utf8_lossy(other).into_owned(),
            )),
        }
    }
}

/// The header of a PGM file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PgmHeader {
    /// Sample encoding.
    pub format: PgmFormat,
    /// Image size in pixels.
    pub size: ImageSize,
    /// Maximum sample value. Informational only, samples are never rescaled.
    pub max_value: usize,
}

// byte cursor over an in-memory PGM file
struct PgmCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> PgmCursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn remaining(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    // a comment runs from '#' to the end of the line
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            self.skip_whitespace();
            if self.peek() != Some(b'#') {
                return;
            }
            while let Some(b) = self.peek() {
                self.pos += 1;
                if b == b'\n' {
                    break;
                }
            }
        }
    }

    fn read_token(&mut self) -> &'a [u8] {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| !b.is_ascii_whitespace() && b != b'#')
        {
            self.pos += 1;
        }
        &self.bytes[start..self.pos]
    }

    fn read_magic(&mut self) -> Result<PgmFormat, IoError> {
        self.skip_whitespace();
        let magic = self.read_token();
        if magic.is_empty() {
            return Err(IoError::InvalidHeader(
                "missing magic number".to_string(),
            ));
        }
        PgmFormat::from_magic(magic)
    }

    fn read_header_value(&mut self, field: &str) -> Result<usize, IoError> {
        self.skip_whitespace_and_comments();

        let token = self.read_token();
        if token.is_empty() {
            return Err(IoError::InvalidHeader(format!(
                "unexpected end of file while reading the {field}"
            )));
        }

        let value = std::str::from_utf8(token)
            .ok()
            .filter(|t| t.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|t| t.parse::<usize>().ok())
            .ok_or_else(|| {
                IoError::InvalidHeader(format!(
                    "expected the {field}, found {:?}",
                    String::from_utf8_lossy(token)
                ))
            })?;

        // a single whitespace byte separates the header from the samples
        if self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }

        Ok(value)
    }

    fn read_header(&mut self) -> Result<PgmHeader, IoError> {
        let format = self.read_magic()?;
        let width = self.read_header_value("width")?;
        let height = self.read_header_value("height")?;
        let max_value = self.read_header_value("maximum value")?;

        Ok(PgmHeader {
            format,
            size: ImageSize { width, height },
            max_value,
        })
    }
}

/// Parse the header of an in-memory PGM file.
///
/// Comments (`#` up to the end of the line) may appear between any of the
/// header tokens.
///
/// # Returns
///
/// The header and the byte offset at which the pixel data starts.
///
/// # Example
///
/// ```
/// use grayedge_io::pgm::{decode_pgm_header, PgmFormat};
///
/// let (header, offset) = decode_pgm_header(b"P5\n# made by hand\n3 2\n255\n\x00\x01\x02\x03\x04\x05").unwrap();
///
/// assert_eq!(header.format, PgmFormat::Binary);
/// assert_eq!(header.size.width, 3);
/// assert_eq!(header.size.height, 2);
/// assert_eq!(offset, 26);
/// ```
pub fn decode_pgm_header(bytes: &[u8]) -> Result<(PgmHeader, usize), IoError> {
    let mut cursor = PgmCursor::new(bytes);
    let header = cursor.read_header()?;

    log::debug!(
        "header is {}, width={}, height={}, max value={}",
        header.format.magic(),
        header.size.width,
        header.size.height,
        header.max_value
    );
    if header.max_value > u8::MAX as usize {
        log::warn!(
            "header declares a maximum value of {}, samples are read as 8 bits",
            header.max_value
        );
    }

    Ok((header, cursor.pos))
}

fn decode_ascii_samples(cursor: &mut PgmCursor, dst: &mut [u8]) -> Result<(), IoError> {
    let expected = dst.len();
    for (index, dst_pixel) in dst.iter_mut().enumerate() {
        cursor.skip_whitespace_and_comments();
        let token = cursor.read_token();
        if token.is_empty() {
            return Err(IoError::TruncatedData {
                expected,
                found: index,
            });
        }
        let value = std::str::from_utf8(token)
            .ok()
            .and_then(|t| t.parse::<i64>().ok())
            .ok_or_else(|| IoError::InvalidSample {
                index,
                token: String::from_utf8_lossy(token).into_owned(),
            })?;
        // samples are narrowed to the low 8 bits
        *dst_pixel = value as u8;
    }
    Ok(())
}

fn decode_binary_samples(cursor: &PgmCursor, dst: &mut [u8]) -> Result<(), IoError> {
    let data = cursor.remaining();
    if data.len() < dst.len() {
        return Err(IoError::TruncatedData {
            expected: dst.len(),
            found: data.len(),
        });
    }
    dst.copy_from_slice(&data[..dst.len()]);
    Ok(())
}

/// Decode an in-memory PGM file into a preallocated image.
///
/// # Arguments
///
/// * `image` - The destination image, must match the size in the header.
/// * `bytes` - The raw bytes of the PGM file.
///
/// # Errors
///
/// Returns [`IoError::SizeMismatch`] if the header size differs from the image size,
/// [`IoError::TruncatedData`] if fewer than `width * height` samples are present.
pub fn decode_image_pgm_into(image: &mut Image<u8>, bytes: &[u8]) -> Result<(), IoError> {
    let mut cursor = PgmCursor::new(bytes);
    let header = cursor.read_header()?;

    if header.size != image.size() {
        return Err(IoError::SizeMismatch(header.size, image.size()));
    }

    match header.format {
        PgmFormat::Ascii => decode_ascii_samples(&mut cursor, image.as_slice_mut()),
        PgmFormat::Binary => decode_binary_samples(&cursor, image.as_slice_mut()),
    }
}

/// Decode an in-memory PGM file.
///
/// # Arguments
///
/// * `bytes` - The raw bytes of a P2 or P5 file.
///
/// # Returns
///
/// A grayscale image with the size announced by the header.
///
/// # Example
///
/// ```
/// use grayedge_io::pgm::decode_image_pgm;
///
/// let image = decode_image_pgm(b"P2\n2 2\n255\n0 64\n128 255\n").unwrap();
///
/// assert_eq!(image.as_slice(), &[0, 64, 128, 255]);
/// ```
pub fn decode_image_pgm(bytes: &[u8]) -> Result<Image<u8>, IoError> {
    let (header, _) = decode_pgm_header(bytes)?;
    let mut image = Image::from_size_val(header.size, 0u8)?;
    decode_image_pgm_into(&mut image, bytes)?;
    Ok(image)
}

/// Read the raw bytes of a PGM file.
///
/// # Errors
///
/// Returns [`IoError::FileDoesNotExist`] if there is no such file and
/// [`IoError::FileError`] if it cannot be read.
pub fn read_pgm_file(file_path: impl AsRef<Path>) -> Result<Vec<u8>, IoError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }
    Ok(std::fs::read(file_path)?)
}

/// Read only the header of a PGM file.
pub fn read_pgm_header(file_path: impl AsRef<Path>) -> Result<PgmHeader, IoError> {
    let bytes = read_pgm_file(file_path)?;
    let (header, _) = decode_pgm_header(&bytes)?;
    Ok(header)
}

/// Read a PGM image (P2 or P5) from disk.
///
/// # Arguments
///
/// * `file_path` - The path to the PGM file.
///
/// # Returns
///
/// A grayscale image with a single channel.
pub fn read_image_pgm(file_path: impl AsRef<Path>) -> Result<Image<u8>, IoError> {
    let file_path = file_path.as_ref();
    log::info!("Reading {} image from disk", file_path.display());

    let bytes = read_pgm_file(file_path)?;
    let image = decode_image_pgm(&bytes)?;
    log::info!(
        "Image successfully read from disk ({}x{})",
        image.cols(),
        image.rows()
    );
    Ok(image)
}

/// Encode an image as an ASCII (P2) PGM stream.
///
/// Every sample is right-aligned in three characters and followed by a space.
/// A line break follows every [`SAMPLES_PER_LINE`] samples of a row, and
/// every row ends with a line break.
///
/// # Example
///
/// ```
/// use grayedge_image::Image;
/// use grayedge_io::pgm::encode_image_pgm;
///
/// let image = Image::new([3, 1].into(), vec![0u8, 7, 255]).unwrap();
/// let mut buf = Vec::new();
/// encode_image_pgm(&mut buf, &image).unwrap();
///
/// assert_eq!(buf, b"P2\n3 1\n255\n  0   7 255 \n");
/// ```
pub fn encode_image_pgm<W: Write>(writer: &mut W, image: &Image<u8>) -> Result<(), IoError> {
    let cols = image.cols();

    writeln!(writer, "{}", PgmFormat::Ascii.magic())?;
    writeln!(writer, "{} {}", cols, image.rows())?;
    writeln!(writer, "{}", u8::MAX)?;

    if cols == 0 {
        return Ok(());
    }

    for row in image.as_slice().chunks_exact(cols) {
        for (i, pixel) in row.iter().enumerate() {
            write!(writer, "{:3} ", pixel)?;
            if i % SAMPLES_PER_LINE == SAMPLES_PER_LINE - 1 {
                writeln!(writer)?;
            }
        }
        if cols % SAMPLES_PER_LINE != 0 {
            writeln!(writer)?;
        }
    }
    Ok(())
}

/// Write an image to disk as an ASCII (P2) PGM file.
///
/// # Arguments
///
/// * `file_path` - The destination path. An existing file is overwritten.
/// * `image` - The image to write.
pub fn write_image_pgm(file_path: impl AsRef<Path>, image: &Image<u8>) -> Result<(), IoError> {
    let file_path = file_path.as_ref();
    log::info!("Writing result to {}", file_path.display());

    let mut writer = BufWriter::new(File::create(file_path)?);
    encode_image_pgm(&mut writer, image)?;
    writer.flush()?;
    Ok(())
}
