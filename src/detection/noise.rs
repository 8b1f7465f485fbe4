use image::GrayImage;
use imageproc::distance_transform::Norm;
use imageproc::morphology::open;

/// Largest kernel side the opening supports (radius must fit a byte)
pub const MAX_KERNEL_SIZE: u32 = 2 * u8::MAX as u32 + 1;

/// Force a kernel size to be odd and at least one
pub fn normalize_kernel_size(kernel_size: u32) -> u32 {
    let size = kernel_size.clamp(1, MAX_KERNEL_SIZE);
    if size % 2 == 0 { size + 1 } else { size }
}

/// Morphological opening with a square `kernel_size` x `kernel_size` element.
///
/// Removes specks smaller than the kernel and smooths mask borders.
pub fn remove_noise(mask: &GrayImage, kernel_size: u32) -> GrayImage {
    let size = normalize_kernel_size(kernel_size);
    if size == 1 {
        return mask.clone();
    }
    // chessboard distance gives a square structuring element of side 2k+1
    let radius = ((size - 1) / 2) as u8;
    open(mask, Norm::LInf, radius)
}
