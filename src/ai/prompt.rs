/// Builds the instruction sent with the image.
///
/// Rectangles only, even with `use_polygon` set: the models are far more
/// consistent with two corners than with outlines. The adapter turns the
/// rectangles into editable polygons afterwards.
pub fn build_prompt(width: u32, height: u32) -> String {
    format!(
        "This image is a sheet of emoji stickers on a plain background. \
         The image is {width} x {height} pixels.\n\
         Find every individual emoji and return ONLY a JSON object of the form:\n\
         {{\"regions\": [{{\"type\": \"rectangle\", \"topLeft\": {{\"x\": 0, \"y\": 0}}, \
         \"bottomRight\": {{\"x\": 0, \"y\": 0}}, \"label\": \"short description\", \
         \"confidence\": 0.9}}]}}\n\
         Rules:\n\
         - Coordinates are integer pixels with the origin at the top-left corner.\n\
         - Each rectangle must tightly enclose one whole emoji, including any small \
         detached parts such as sparkles or tears.\n\
         - Do not include text captions or the background.\n\
         - Use \"type\": \"rectangle\" for every region.\n\
         - Return {{\"regions\": []}} if there are no emoji."
    )
}
