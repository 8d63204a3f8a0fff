use image::{imageops, DynamicImage};
use tract_onnx::prelude::*;

/// Squares the image by centre crop, then scales it to `size`.
pub fn resize_image(image: &DynamicImage, size: u32) -> DynamicImage {
    if image.width() == size && image.height() == size {
        return image.clone();
    }

    let side = image.width().min(image.height());
    let x_offset = (image.width() - side) / 2;
    let y_offset = (image.height() - side) / 2;

    image
        .crop_imm(x_offset, y_offset, side, side)
        .resize_exact(size, size, imageops::FilterType::Triangle)
}

/// NHWC tensor with channels scaled to [-1, 1].
fn image_to_tensor(image: &DynamicImage) -> Result<Tensor, Box<dyn std::error::Error + Send + Sync>> {
    let rgb = image.to_rgb8();
    let (width, height) = (rgb.width() as usize, rgb.height() as usize);

    let tensor = tract_ndarray::Array4::from_shape_fn((1, height, width, 3), |(_, y, x, c)| {
        let pixel = rgb.get_pixel(x as u32, y as u32);
        pixel[c] as f32 / 127.5 - 1.0
    });

    Ok(tensor.into_tensor())
}

pub fn resize_image_to_tensor(
    image: &DynamicImage,
    size: u32,
) -> Result<Tensor, Box<dyn std::error::Error + Send + Sync>> {
    let resized = resize_image(image, size);
    let tensor = image_to_tensor(&resized)?;

    Ok(tensor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, Rgb};

    #[test]
    fn test_image_to_tensor_square() {
        let mut img = ImageBuffer::new(224, 224);
        for pixel in img.pixels_mut() {
            *pixel = Rgb([255, 0, 0]);
        }
        let image = DynamicImage::ImageRgb8(img);

        let tensor = resize_image_to_tensor(&image, 224).unwrap();
        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);

        let slice = tensor.as_slice::<f32>().unwrap();
        assert_eq!(slice[0], 1.0);
        assert_eq!(slice[1], -1.0);
        assert_eq!(slice[2], -1.0);
    }

    #[test]
    fn test_image_to_tensor_rectangle_is_centre_cropped() {
        // Left and right thirds blue, middle third red.
        let mut img = ImageBuffer::new(300, 100);
        for (x, _, pixel) in img.enumerate_pixels_mut() {
            *pixel = if (100..200).contains(&x) {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            };
        }
        let image = DynamicImage::ImageRgb8(img);

        let resized = resize_image(&image, 50);
        assert_eq!((resized.width(), resized.height()), (50, 50));

        let rgb = resized.to_rgb8();
        for pixel in [rgb.get_pixel(0, 0), rgb.get_pixel(49, 49)] {
            assert!(pixel[0] > 250 && pixel[2] < 5, "unexpected pixel {:?}", pixel);
        }
    }

    #[test]
    fn test_image_to_tensor_normalization() {
        let mut img = ImageBuffer::new(10, 10);
        for pixel in img.pixels_mut() {
            *pixel = Rgb([0, 51, 255]);
        }
        let image = DynamicImage::ImageRgb8(img);

        let tensor = resize_image_to_tensor(&image, 10).unwrap();
        let slice = tensor.as_slice::<f32>().unwrap();

        assert!((slice[0] + 1.0).abs() < 0.0001);
        assert!((slice[1] - (51.0 / 127.5 - 1.0)).abs() < 0.0001);
        assert!((slice[2] - 1.0).abs() < 0.0001);
    }
}
