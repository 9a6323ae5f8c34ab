//! Stretches the fixed-size internal framebuffer onto the window surface.
//!
//! Nearest-neighbour keeps the hard pixel edges of the column strips.

use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

/// Source column/row for every destination column/row
pub struct ScaleLut {
    src_x: Vec<usize>,
    src_y: Vec<usize>,
}

impl ScaleLut {
    pub fn empty() -> Self {
        Self {
            src_x: Vec::new(),
            src_y: Vec::new(),
        }
    }
}

fn axis(dst: usize, src: usize) -> Vec<usize> {
    if src == 0 {
        return vec![0; dst];
    }
    (0..dst).map(|d| (d * src / dst).min(src - 1)).collect()
}

pub fn build_scale_lut(dst_w: usize, dst_h: usize, src_w: usize, src_h: usize) -> ScaleLut {
    ScaleLut {
        src_x: axis(dst_w, src_w),
        src_y: axis(dst_h, src_h),
    }
}

/// Parallel nearest-neighbour stretch, one destination row per task.
pub fn blit_nearest(dst: &mut [u32], dw: usize, src: &[u32], sw: usize, lut: &ScaleLut) {
    dst.par_chunks_mut(dw).enumerate().for_each(|(y, dst_row)| {
        let Some(&sy) = lut.src_y.get(y) else {
            return;
        };
        let src_row = &src[sy * sw..(sy + 1) * sw];
        for (px, &sx) in dst_row.iter_mut().zip(&lut.src_x) {
            *px = src_row[sx];
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubles_each_pixel() {
        let src = [1, 2, 3, 4];
        let lut = build_scale_lut(4, 4, 2, 2);
        let mut dst = vec![0; 16];
        blit_nearest(&mut dst, 4, &src, 2, &lut);
        assert_eq!(
            dst,
            vec![1, 1, 2, 2, 1, 1, 2, 2, 3, 3, 4, 4, 3, 3, 4, 4]
        );
    }

    #[test]
    fn shrinking_stays_in_bounds() {
        let lut = build_scale_lut(3, 1, 7, 5);
        let src: Vec<u32> = (0..35).collect();
        let mut dst = vec![0; 3];
        blit_nearest(&mut dst, 3, &src, 7, &lut);
        assert_eq!(dst, vec![0, 2, 4]);
    }
}
