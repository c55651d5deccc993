#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use grayedge_image as image;

#[doc(inline)]
pub use grayedge_imgproc as imgproc;

#[doc(inline)]
pub use grayedge_io as io;

#[doc(inline)]
pub use grayedge_kernels as kernels;

/// Directory driver that runs the pipeline over every PGM file it finds.
pub mod batch;

/// Single image load, blur, edge and write pipeline.
pub mod pipeline;
